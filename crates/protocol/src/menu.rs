// Chunk: docs/chunks/menu_state - Window-scoped menu enablement

use serde::{Deserialize, Serialize};

use crate::WindowId;

/// Menu enablement derived from the focused window.
///
/// Some menu items act on "the current window" (save, revert, show in folder),
/// so the host refreshes its menus whenever focus moves, a window closes or the
/// focused document changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MenuState {
    /// The window menu commands act on, if any.
    pub focused: Option<WindowId>,
    /// Number of open windows.
    pub window_count: usize,
    /// The focused window is bound to a file on disk.
    pub document_bound: bool,
    /// The focused window has unsaved edits.
    pub document_edited: bool,
}

impl MenuState {
    /// "Save" applies to the focused window.
    pub fn save_enabled(&self) -> bool {
        self.focused.is_some()
    }

    /// "Revert" only makes sense with edits to throw away.
    pub fn revert_enabled(&self) -> bool {
        self.focused.is_some() && self.document_edited
    }

    /// "Show in folder" and "open in default app" need a file on disk.
    pub fn reveal_enabled(&self) -> bool {
        self.focused.is_some() && self.document_bound
    }
}
