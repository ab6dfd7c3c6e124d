// Chunk: docs/chunks/window_protocol - Coordinator <-> window message types

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A request sent by a window to the coordinator.
///
/// Requests are fire-and-forget. The coordinator answers (if at all) with one
/// or more [`WindowMessage`]s on the window's own link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowRequest {
    /// The window's content surface finished loading and may be shown.
    ContentReady,
    /// The window gained focus.
    Focused,
    /// The user asked to close the window (chrome close button, Cmd+W).
    RequestClose,
    /// Open a fresh, untitled window.
    RequestNewWindow,
    /// Show the open picker for this window.
    RequestOpenPicker,
    /// Open a new window, then show the open picker in it once it is visible.
    RequestOpenPickerInNewWindow,
    /// Read `path` into this window (drag-drop or programmatic open).
    RequestRead { path: PathBuf },
    /// Save the buffer: in place when bound, through the save picker otherwise.
    /// The saved file is re-read and re-watched afterwards.
    RequestWriteMarkdown { content: String },
    /// Save the buffer through the save picker regardless of binding.
    RequestSaveAs { content: String },
    /// Export rendered HTML through the save picker. Exports are never bound
    /// or watched.
    RequestWriteHtml { content: String },
    /// The view's dirty flag changed.
    SetDocumentEdited { edited: bool },
}

impl WindowRequest {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            WindowRequest::ContentReady => "content-ready",
            WindowRequest::Focused => "focused",
            WindowRequest::RequestClose => "request-close",
            WindowRequest::RequestNewWindow => "request-new-window",
            WindowRequest::RequestOpenPicker => "request-open-picker",
            WindowRequest::RequestOpenPickerInNewWindow => "request-open-picker-in-new-window",
            WindowRequest::RequestRead { .. } => "request-read",
            WindowRequest::RequestWriteMarkdown { .. } => "request-write-markdown",
            WindowRequest::RequestSaveAs { .. } => "request-save-as",
            WindowRequest::RequestWriteHtml { .. } => "request-write-html",
            WindowRequest::SetDocumentEdited { .. } => "set-document-edited",
        }
    }
}

/// Why a document's content is being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentOrigin {
    /// A fresh open (picker, drop, OS request). Replaces the buffer.
    Opened,
    /// Re-read after our own successful write. Refreshes the baseline only.
    Saved,
    /// Re-read after the user chose to reload an external change. Replaces the buffer.
    Reloaded,
}

impl DocumentOrigin {
    /// Returns true if the delivery should overwrite the view's buffer.
    pub fn replaces_buffer(self) -> bool {
        !matches!(self, DocumentOrigin::Saved)
    }
}

/// The filesystem operation that failed, for user-visible reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Read,
    Write,
    ExportHtml,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::ExportHtml => "export",
        };
        f.write_str(name)
    }
}

/// A message sent by the coordinator to one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowMessage {
    /// Content for the window's document, which is now bound to `path`.
    DocumentReady {
        path: PathBuf,
        content: String,
        origin: DocumentOrigin,
    },
    /// An external-change prompt is open for this window.
    ExternalChangeDetected { path: PathBuf },
    /// The bound file disappeared from disk; a prompt is open for this window.
    FileRemoved { path: PathBuf },
    /// The prompt opened by `ExternalChangeDetected` or `FileRemoved` was answered.
    ConflictPromptClosed,
    /// The coordinator needs the current buffer to run "save as".
    /// The window answers with [`WindowRequest::RequestSaveAs`].
    SaveAsRequested,
    /// A read or write failed. Binding and dirty state are unchanged.
    OperationFailed {
        operation: Operation,
        path: Option<PathBuf>,
        message: String,
    },
    /// External-change detection is unavailable for `path`. Editing and
    /// saving still work.
    WatchUnavailable { path: PathBuf, message: String },
    /// The window was closed. No further messages follow.
    Closed,
}
