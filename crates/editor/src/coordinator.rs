// Chunk: docs/chunks/coordinator - Single owner of windows, bindings and watches
//!
//! The coordinator.
//!
//! One `Coordinator` owns every registry (windows, file bindings, watches,
//! pending prompts and pickers) and is the only component that touches the
//! filesystem. Everything else talks to it through [`EditorEvent`]s and hears
//! back through per-window [`WindowMessage`]s.
//!
//! # Document lifecycle
//!
//! - **Open**: read first. A failed read aborts before any state changes. If
//!   the window has unsaved edits the user confirms before the buffer is
//!   replaced. Binding then delivers the content, starts the watch, records
//!   the recent document and refreshes the menu.
//! - **Save**: the watch is torn down, the file is written and immediately
//!   re-read, which rebinds and re-watches. Echoes of the write that were
//!   already queued carry the old watcher id and are dropped as stale.
//!   Other windows bound to the same path keep their watches and are
//!   prompted like for any other writer.
//!   A failed write restores the previous watch and leaves everything else
//!   as it was.
//! - **External change**: watch notices pass through a fixed pipeline of
//!   liveness, watcher identity, the pending-prompt gate and an
//!   unchanged-content check against the window's own baseline before a
//!   prompt is shown.
//! - **Close**: confirmed if dirty, then the watch is released synchronously
//!   and the window is unregistered.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shadow_edit_protocol::{
    ConfirmResponse, DialogTicket, DocumentOrigin, MenuState, OpenDialogOptions,
    SaveDialogOptions, WindowId, WindowMessage, WindowRequest,
};

use crate::config::EditorConfig;
use crate::conflict::{ConflictResolver, ConflictTrigger, DocumentState, Gate, Resolution};
use crate::document_io::{export_html, read_document, write_document};
use crate::editor_event::EditorEvent;
use crate::error::DocumentError;
use crate::event_channel::{EventSender, WindowEndpoint};
use crate::file_watch_registry::{
    FileWatchRegistry, WatchEventKind, WatchFactory, WatchNotice, WatcherId,
};
use crate::host::{HostEnvironment, ModalPresenter};
use crate::window_registry::{DeferredAction, FileBinding, WindowRegistry};

/// Why a picker was shown.
enum PickerPurpose {
    Open,
    SaveMarkdown { content: String },
    ExportHtml { content: String },
}

struct PendingPicker {
    window: WindowId,
    purpose: PickerPurpose,
}

pub struct Coordinator {
    config: EditorConfig,
    windows: WindowRegistry,
    watches: FileWatchRegistry,
    conflicts: ConflictResolver,
    pickers: HashMap<DialogTicket, PendingPicker>,
    host: Box<dyn HostEnvironment>,
    presenter: Box<dyn ModalPresenter>,
    sender: EventSender,
    next_ticket: u64,
}

impl Coordinator {
    pub fn new(
        config: EditorConfig,
        watch_factory: Box<dyn WatchFactory>,
        host: Box<dyn HostEnvironment>,
        presenter: Box<dyn ModalPresenter>,
        sender: EventSender,
    ) -> Self {
        let watch_sender = sender.clone();
        let watches = FileWatchRegistry::new(
            watch_factory,
            Arc::new(move |notice: WatchNotice| {
                // Fails only once the drain loop has exited.
                let _ = watch_sender.send_watch(notice);
            }),
        );

        Self {
            config,
            windows: WindowRegistry::new(),
            watches,
            conflicts: ConflictResolver::new(),
            pickers: HashMap::new(),
            host,
            presenter,
            sender,
            next_ticket: 1,
        }
    }

    // =========================================================================
    // Window lifecycle
    // =========================================================================

    /// Creates a hidden, unbound window. It is shown once its view reports
    /// `ContentReady`.
    pub fn create_window(&mut self) -> WindowId {
        let (id, inbox) = self.windows.create();
        self.host
            .create_surface(WindowEndpoint::new(id, inbox, self.sender.clone()));
        tracing::info!(window = %id, "window created");
        self.refresh_menu();
        id
    }

    /// Creates a window and opens `path` in it once it is ready.
    pub fn open_in_new_window(&mut self, path: PathBuf) -> WindowId {
        let id = self.create_window();
        if let Some(entry) = self.windows.get_mut(id) {
            entry.deferred = Some(DeferredAction::Open(path));
        }
        id
    }

    fn close_window(&mut self, window: WindowId) {
        let dirty = self.is_edited(window);
        let ticket = self.next_ticket();
        match self
            .conflicts
            .request(window, dirty, ConflictTrigger::CloseWithUnsavedEdits, ticket)
        {
            Gate::Proceed => self.destroy_window(window),
            Gate::Prompt { ticket, request } => self.presenter.confirm(window, ticket, request),
            Gate::Suppressed => {
                tracing::debug!(%window, "close requested while a prompt is pending; ignored");
            }
        }
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.watches.stop_watching(window);
        self.conflicts.forget_window(window);
        self.pickers.retain(|_, p| p.window != window);
        self.windows.deliver(window, WindowMessage::Closed);
        self.windows.remove(window);
        self.host.destroy_surface(window);
        tracing::info!(%window, remaining = self.windows.len(), "window closed");
        self.refresh_menu();
    }

    // =========================================================================
    // Event dispatch
    // =========================================================================

    pub fn handle_event(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::Window { window, request } => {
                if !self.windows.contains(window) {
                    tracing::debug!(%window, request = request.name(), "request from closed window dropped");
                    return;
                }
                self.handle_request(window, request);
            }
            EditorEvent::Watch(notice) => self.handle_watch_notice(notice),
            EditorEvent::DialogAnswered { ticket, response } => {
                self.handle_dialog_answer(ticket, response)
            }
            EditorEvent::PickerAnswered { ticket, path } => self.handle_picker_answer(ticket, path),
            EditorEvent::OpenFile(path) => {
                self.open_in_new_window(path);
            }
            EditorEvent::Shutdown => {}
        }
    }

    fn handle_request(&mut self, window: WindowId, request: WindowRequest) {
        tracing::trace!(%window, request = request.name(), "window request");
        match request {
            WindowRequest::ContentReady => {
                let deferred = self.windows.mark_ready(window);
                self.host.show_surface(window);
                match deferred {
                    Some(DeferredAction::Open(path)) => self.open_path(window, path),
                    Some(DeferredAction::OpenPicker) => self.show_open_picker(window),
                    None => {}
                }
            }
            WindowRequest::Focused => {
                self.windows.set_focused(window);
                self.refresh_menu();
            }
            WindowRequest::RequestClose => self.close_window(window),
            WindowRequest::RequestNewWindow => {
                self.create_window();
            }
            WindowRequest::RequestOpenPicker => self.show_open_picker(window),
            WindowRequest::RequestOpenPickerInNewWindow => {
                let id = self.create_window();
                if let Some(entry) = self.windows.get_mut(id) {
                    entry.deferred = Some(DeferredAction::OpenPicker);
                }
            }
            WindowRequest::RequestRead { path } => self.open_path(window, path),
            WindowRequest::RequestWriteMarkdown { content } => match self.bound_path(window) {
                Some(path) => self.save_to(window, path, content),
                None => self.show_save_picker(window, content),
            },
            WindowRequest::RequestSaveAs { content } => self.show_save_picker(window, content),
            WindowRequest::RequestWriteHtml { content } => {
                let ticket = self.register_picker(window, PickerPurpose::ExportHtml { content });
                let options = SaveDialogOptions::html(self.config.documents_dir());
                self.presenter.pick_save(window, ticket, &options);
            }
            WindowRequest::SetDocumentEdited { edited } => {
                if let Some(entry) = self.windows.get_mut(window) {
                    entry.edited = edited;
                }
                self.refresh_menu();
            }
        }
    }

    // =========================================================================
    // Open / bind
    // =========================================================================

    fn open_path(&mut self, window: WindowId, path: PathBuf) {
        let content = match read_document(&path) {
            Ok(content) => content,
            Err(e) => return self.report_failure(window, &e),
        };

        let dirty = self.is_edited(window);
        let ticket = self.next_ticket();
        let trigger = ConflictTrigger::OpenOverUnsavedEdits {
            path: path.clone(),
            content: content.clone(),
        };
        match self.conflicts.request(window, dirty, trigger, ticket) {
            Gate::Proceed => self.bind(window, path, content, DocumentOrigin::Opened),
            Gate::Prompt { ticket, request } => self.presenter.confirm(window, ticket, request),
            Gate::Suppressed => {}
        }
    }

    /// Delivers `content` and makes `path` the window's binding with `content`
    /// as baseline, then (re)starts its watch.
    fn bind(&mut self, window: WindowId, path: PathBuf, content: String, origin: DocumentOrigin) {
        let Some(entry) = self.windows.get_mut(window) else {
            return;
        };
        entry.binding = Some(FileBinding {
            path: path.clone(),
            baseline: content.clone(),
        });
        if origin.replaces_buffer() {
            entry.edited = false;
        }

        self.windows.deliver(
            window,
            WindowMessage::DocumentReady {
                path: path.clone(),
                content,
                origin,
            },
        );
        self.start_watch(window, &path);
        self.host.add_recent_document(&path);
        self.host.set_represented_filename(window, &path);
        tracing::info!(%window, path = %path.display(), ?origin, "document bound");
        self.refresh_menu();
    }

    fn start_watch(&mut self, window: WindowId, path: &Path) {
        if let Err(e) = self.watches.start_watching(window, path) {
            tracing::warn!(%window, error = %e, "external change detection unavailable");
            self.windows.deliver(
                window,
                WindowMessage::WatchUnavailable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                },
            );
        }
    }

    fn show_open_picker(&mut self, window: WindowId) {
        let ticket = self.register_picker(window, PickerPurpose::Open);
        self.presenter
            .pick_open(window, ticket, &OpenDialogOptions::documents());
    }

    // =========================================================================
    // Save / export
    // =========================================================================

    fn show_save_picker(&mut self, window: WindowId, content: String) {
        let ticket = self.register_picker(window, PickerPurpose::SaveMarkdown { content });
        let options = SaveDialogOptions::markdown(self.config.documents_dir());
        self.presenter.pick_save(window, ticket, &options);
    }

    fn save_to(&mut self, window: WindowId, path: PathBuf, content: String) {
        self.watches.stop_watching(window);

        let reread = write_document(&path, &content).and_then(|()| read_document(&path));
        match reread {
            Ok(saved) => {
                tracing::info!(%window, path = %path.display(), bytes = content.len(), "document saved");
                self.bind(window, path, saved, DocumentOrigin::Saved);
            }
            Err(e) => {
                self.report_failure(window, &e);
                if let Some(previous) = self.bound_path(window) {
                    self.start_watch(window, &previous);
                }
            }
        }
    }

    fn handle_picker_answer(&mut self, ticket: DialogTicket, path: Option<PathBuf>) {
        let Some(PendingPicker { window, purpose }) = self.pickers.remove(&ticket) else {
            tracing::debug!(%ticket, "answer for unknown picker dropped");
            return;
        };
        if !self.windows.contains(window) {
            return;
        }

        let path = match path.ok_or(DocumentError::UserCancelled) {
            Ok(path) => path,
            Err(e) => return self.report_failure(window, &e),
        };
        match purpose {
            PickerPurpose::Open => self.open_path(window, path),
            PickerPurpose::SaveMarkdown { content } => self.save_to(window, path, content),
            PickerPurpose::ExportHtml { content } => {
                match export_html(&path, &content) {
                    Ok(()) => tracing::info!(%window, path = %path.display(), "html exported"),
                    Err(e) => self.report_failure(window, &e),
                }
            }
        }
    }

    // =========================================================================
    // External changes
    // =========================================================================

    fn handle_watch_notice(&mut self, notice: WatchNotice) {
        let window = notice.window;
        if !self.windows.contains(window) {
            tracing::debug!(%window, "watch notice for closed window dropped");
            return;
        }
        if !self.watches.is_current(&notice) {
            tracing::debug!(%window, watcher = notice.watcher.0, "stale watch notice dropped");
            return;
        }

        let WatchNotice { path, kind, .. } = notice;
        match kind {
            WatchEventKind::Failed(message) => {
                tracing::warn!(%window, path = %path.display(), %message, "watch failed");
                self.windows
                    .deliver(window, WindowMessage::WatchUnavailable { path, message });
            }
            WatchEventKind::Removed => {
                tracing::warn!(%window, path = %path.display(), "bound file removed");
                self.raise_prompt(
                    window,
                    ConflictTrigger::FileRemoved { path: path.clone() },
                    WindowMessage::FileRemoved { path },
                );
            }
            WatchEventKind::Modified => {
                if self.conflicts.is_pending(window) {
                    tracing::debug!(%window, "prompt already pending; change dropped");
                    return;
                }
                if self.matches_baseline(window, &path) {
                    tracing::debug!(%window, path = %path.display(), "content unchanged; notice dropped");
                    return;
                }
                self.raise_prompt(
                    window,
                    ConflictTrigger::ExternalChange { path: path.clone() },
                    WindowMessage::ExternalChangeDetected { path },
                );
            }
        }
    }

    fn raise_prompt(&mut self, window: WindowId, trigger: ConflictTrigger, notify: WindowMessage) {
        let dirty = self.is_edited(window);
        let ticket = self.next_ticket();
        match self.conflicts.request(window, dirty, trigger, ticket) {
            Gate::Prompt { ticket, request } => {
                self.windows.deliver(window, notify);
                self.presenter.confirm(window, ticket, request);
            }
            Gate::Proceed | Gate::Suppressed => {}
        }
    }

    /// True if the file on disk still holds the binding's baseline. A read
    /// failure counts as changed.
    fn matches_baseline(&self, window: WindowId, path: &Path) -> bool {
        let Some(binding) = self.binding(window) else {
            return false;
        };
        match read_document(path) {
            Ok(disk) => disk == binding.baseline,
            Err(_) => false,
        }
    }

    fn handle_dialog_answer(&mut self, ticket: DialogTicket, response: ConfirmResponse) {
        let Some(resolution) = self.conflicts.resolve(ticket, response) else {
            tracing::debug!(%ticket, "answer for unknown dialog dropped");
            return;
        };
        let window = resolution.window();
        if !self.windows.contains(window) {
            return;
        }
        tracing::debug!(%window, ?resolution, "prompt answered");

        match resolution {
            Resolution::Close { .. } => self.destroy_window(window),
            Resolution::KeepOpen { .. } | Resolution::IgnoreOpen { .. } => {}
            Resolution::Open { path, content, .. } => {
                self.bind(window, path, content, DocumentOrigin::Opened)
            }
            Resolution::Reload { path, .. } => {
                self.windows.deliver(window, WindowMessage::ConflictPromptClosed);
                match read_document(&path) {
                    Ok(content) => self.bind(window, path, content, DocumentOrigin::Reloaded),
                    Err(e) => self.report_failure(window, &e),
                }
            }
            Resolution::IgnoreChange { .. } | Resolution::KeepDeleted { .. } => {
                self.windows.deliver(window, WindowMessage::ConflictPromptClosed);
            }
            Resolution::SaveAs { .. } => {
                self.windows.deliver(window, WindowMessage::ConflictPromptClosed);
                self.windows.deliver(window, WindowMessage::SaveAsRequested);
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Surfaces a failed operation as an alert plus `OperationFailed`.
    /// Cancellation is not a failure and is ignored.
    fn report_failure(&mut self, window: WindowId, error: &DocumentError) {
        if error.is_cancelled() {
            tracing::debug!(%window, "cancelled by user");
            return;
        }
        tracing::warn!(%window, error = %error, "document operation failed");

        let Some(operation) = error.operation() else {
            return;
        };
        self.presenter.alert(
            window,
            &format!("Unable to {operation} file"),
            &error.to_string(),
        );
        self.windows.deliver(
            window,
            WindowMessage::OperationFailed {
                operation,
                path: error.path().cloned(),
                message: error.to_string(),
            },
        );
    }

    fn register_picker(&mut self, window: WindowId, purpose: PickerPurpose) -> DialogTicket {
        let ticket = self.next_ticket();
        self.pickers.insert(ticket, PendingPicker { window, purpose });
        ticket
    }

    fn next_ticket(&mut self) -> DialogTicket {
        let ticket = DialogTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    fn bound_path(&self, window: WindowId) -> Option<PathBuf> {
        self.binding(window).map(|b| b.path.clone())
    }

    fn refresh_menu(&mut self) {
        let state = self.menu_state();
        self.host.refresh_menu(&state);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn menu_state(&self) -> MenuState {
        let focused = self.windows.focused();
        let entry = focused.and_then(|id| self.windows.get(id));
        MenuState {
            focused,
            window_count: self.windows.len(),
            document_bound: entry.is_some_and(|e| e.binding.is_some()),
            document_edited: entry.is_some_and(|e| e.edited),
        }
    }

    pub fn binding(&self, window: WindowId) -> Option<&FileBinding> {
        self.windows.get(window)?.binding.as_ref()
    }

    pub fn watcher_id(&self, window: WindowId) -> Option<WatcherId> {
        self.watches.watcher_id(window)
    }

    pub fn watched_path(&self, window: WindowId) -> Option<&Path> {
        self.watches.watched_path(window)
    }

    pub fn watcher_count(&self) -> usize {
        self.watches.watcher_count()
    }

    pub fn is_edited(&self, window: WindowId) -> bool {
        self.windows.get(window).is_some_and(|e| e.edited)
    }

    pub fn is_visible(&self, window: WindowId) -> bool {
        self.windows.get(window).is_some_and(|e| e.visible)
    }

    pub fn prompt_pending(&self, window: WindowId) -> bool {
        self.conflicts.is_pending(window)
    }

    pub fn document_state(&self, window: WindowId) -> DocumentState {
        self.conflicts.state(window, self.is_edited(window))
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.ids()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn has_window(&self, window: WindowId) -> bool {
        self.windows.contains(window)
    }
}

