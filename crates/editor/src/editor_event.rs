// Chunk: docs/chunks/coordinator_queue - Unified coordinator event queue
//! Event types for the coordinator's queue.
//!
//! Window requests, watch notices, dialog answers and OS open requests all
//! arrive through one channel. A single drain loop owns the coordinator and
//! handles them one at a time, so registries never need locking.

use std::path::PathBuf;

use shadow_edit_protocol::{ConfirmResponse, DialogTicket, WindowId, WindowRequest};

use crate::file_watch_registry::WatchNotice;

#[derive(Debug)]
pub enum EditorEvent {
    /// A request from one window's view.
    Window {
        window: WindowId,
        request: WindowRequest,
    },

    /// A debounced notice from a file watch.
    Watch(WatchNotice),

    /// The presenter's answer to a confirmation.
    DialogAnswered {
        ticket: DialogTicket,
        response: ConfirmResponse,
    },

    /// The presenter's answer to an open or save picker. `None` means cancelled.
    PickerAnswered {
        ticket: DialogTicket,
        path: Option<PathBuf>,
    },

    /// The OS asked us to open a file (command line, Finder, dock drop).
    OpenFile(PathBuf),

    /// Stop the drain loop.
    Shutdown,
}

impl EditorEvent {
    /// The window this event concerns, if any.
    pub fn window(&self) -> Option<WindowId> {
        match self {
            EditorEvent::Window { window, .. } => Some(*window),
            EditorEvent::Watch(notice) => Some(notice.window),
            _ => None,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, EditorEvent::Shutdown)
    }
}
