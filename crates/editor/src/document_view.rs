// Chunk: docs/chunks/dirty_state - Per-window dirty tracking
//!
//! Window-side document state.
//!
//! A `DocumentView` is what runs inside one window: it holds the edit buffer
//! and the baseline last delivered by the coordinator, derives the dirty flag
//! from them, and formats the title. It never touches the filesystem; every
//! method that needs the coordinator returns the [`WindowRequest`] to send.
//!
//! The dirty flag is always `buffer != baseline`. `SetDocumentEdited` is only
//! emitted when that flag flips, so the coordinator sees one message per
//! transition rather than one per keystroke.

use std::path::{Path, PathBuf};

use shadow_edit_protocol::{WindowId, WindowMessage, WindowRequest};

use crate::config::EditorConfig;
use crate::document_io::is_supported_document;
use crate::error::{DocumentError, DocumentResult};

/// Which document commands are currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affordances {
    pub save_enabled: bool,
    pub revert_enabled: bool,
}

#[derive(Debug)]
pub struct DocumentView {
    window: WindowId,
    app_name: String,
    dirty_marker: String,
    untitled_label: String,
    file_path: Option<PathBuf>,
    baseline: String,
    buffer: String,
    edited: bool,
    conflict_prompt_open: bool,
    watch_available: bool,
    last_error: Option<String>,
    closed: bool,
    title: String,
    affordances: Affordances,
}

impl DocumentView {
    pub fn new(window: WindowId, config: &EditorConfig) -> Self {
        let mut view = Self {
            window,
            app_name: config.app_name.clone(),
            dirty_marker: config.dirty_marker.clone(),
            untitled_label: config.untitled_label.clone(),
            file_path: None,
            baseline: String::new(),
            buffer: String::new(),
            edited: false,
            conflict_prompt_open: false,
            watch_available: true,
            last_error: None,
            closed: false,
            title: String::new(),
            affordances: Affordances::default(),
        };
        view.refresh_chrome();
        view
    }

    // =========================================================================
    // Local edits
    // =========================================================================

    /// Replaces the buffer with the editor's current text.
    pub fn on_buffer_changed(&mut self, content: impl Into<String>) -> Option<WindowRequest> {
        self.buffer = content.into();
        self.recompute()
    }

    /// Throws away local edits. Always leaves the view clean.
    pub fn on_revert(&mut self) -> Option<WindowRequest> {
        self.buffer = self.baseline.clone();
        self.recompute()
    }

    fn recompute(&mut self) -> Option<WindowRequest> {
        let dirty = self.buffer != self.baseline;
        if dirty == self.edited {
            return None;
        }
        self.edited = dirty;
        self.refresh_chrome();
        Some(WindowRequest::SetDocumentEdited { edited: dirty })
    }

    fn refresh_chrome(&mut self) {
        let name = self
            .file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.untitled_label.clone());

        self.title = if self.edited {
            format!("{name} - {} {}", self.app_name, self.dirty_marker)
        } else {
            format!("{name} - {}", self.app_name)
        };
        self.affordances = Affordances {
            save_enabled: self.edited,
            revert_enabled: self.edited,
        };
    }

    // =========================================================================
    // Coordinator messages
    // =========================================================================

    /// Applies a coordinator message. Returns a request to send back, if the
    /// message asks for one or changed the dirty flag.
    pub fn handle_message(&mut self, message: WindowMessage) -> Option<WindowRequest> {
        match message {
            WindowMessage::DocumentReady {
                path,
                content,
                origin,
            } => {
                self.file_path = Some(path);
                if origin.replaces_buffer() {
                    self.buffer = content.clone();
                }
                self.baseline = content;
                self.last_error = None;
                self.watch_available = true;
                self.refresh_chrome();
                self.recompute()
            }
            WindowMessage::ExternalChangeDetected { .. } | WindowMessage::FileRemoved { .. } => {
                self.conflict_prompt_open = true;
                None
            }
            WindowMessage::ConflictPromptClosed => {
                self.conflict_prompt_open = false;
                None
            }
            WindowMessage::SaveAsRequested => Some(self.request_save_as()),
            WindowMessage::OperationFailed { message, .. } => {
                self.last_error = Some(message);
                None
            }
            WindowMessage::WatchUnavailable { .. } => {
                self.watch_available = false;
                None
            }
            WindowMessage::Closed => {
                self.closed = true;
                None
            }
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    pub fn request_save(&self) -> WindowRequest {
        WindowRequest::RequestWriteMarkdown {
            content: self.buffer.clone(),
        }
    }

    pub fn request_save_as(&self) -> WindowRequest {
        WindowRequest::RequestSaveAs {
            content: self.buffer.clone(),
        }
    }

    pub fn request_export_html(&self, rendered: impl Into<String>) -> WindowRequest {
        WindowRequest::RequestWriteHtml {
            content: rendered.into(),
        }
    }

    pub fn request_open(&self, path: impl Into<PathBuf>) -> WindowRequest {
        WindowRequest::RequestRead { path: path.into() }
    }

    /// Accepts a dropped file if it looks like a document.
    pub fn drop_file(&self, path: impl Into<PathBuf>) -> DocumentResult<WindowRequest> {
        let path = path.into();
        if is_supported_document(&path) {
            Ok(WindowRequest::RequestRead { path })
        } else {
            Err(DocumentError::UnsupportedFileType { path })
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn affordances(&self) -> Affordances {
        self.affordances
    }

    pub fn conflict_prompt_open(&self) -> bool {
        self.conflict_prompt_open
    }

    pub fn watch_available(&self) -> bool {
        self.watch_available
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
