// Chunk: docs/chunks/window_registry - Coordinator-owned window table
//!
//! The coordinator's table of open windows.
//!
//! Each entry holds what the coordinator knows about a window: whether its
//! surface has been shown, its file binding, the edited flag the view last
//! reported, an action deferred until the surface is ready, and the link used
//! to send it messages.
//!
//! # Debug Invariants
//!
//! In debug builds the registry checks that ids are unique and never reused,
//! and that the focused window, if any, is registered.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crossbeam_channel::{unbounded, Receiver, Sender};
use shadow_edit_protocol::{WindowId, WindowMessage};

/// A window's association with a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBinding {
    pub path: PathBuf,
    /// Content as last read from disk.
    pub baseline: String,
}

/// Work to run once a window's surface reports it is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    Open(PathBuf),
    OpenPicker,
}

#[derive(Debug)]
pub struct WindowEntry {
    pub id: WindowId,
    pub visible: bool,
    pub binding: Option<FileBinding>,
    pub edited: bool,
    pub deferred: Option<DeferredAction>,
    link: Sender<WindowMessage>,
}

#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, WindowEntry>,
    focused: Option<WindowId>,
    next_id: u64,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new hidden, unbound, unedited window. Returns its id and
    /// the receiving end of its message link.
    pub fn create(&mut self) -> (WindowId, Receiver<WindowMessage>) {
        self.next_id += 1;
        let id = WindowId(self.next_id);
        let (link, inbox) = unbounded();

        debug_assert!(
            !self.windows.contains_key(&id),
            "WindowRegistry: id {id} allocated twice"
        );
        self.windows.insert(
            id,
            WindowEntry {
                id,
                visible: false,
                binding: None,
                edited: false,
                deferred: None,
                link,
            },
        );

        #[cfg(debug_assertions)]
        self.debug_check_invariants();
        (id, inbox)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowEntry> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowEntry> {
        self.windows.get_mut(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// Unregisters a window, returning its entry. Clears focus if it pointed here.
    pub fn remove(&mut self, id: WindowId) -> Option<WindowEntry> {
        let entry = self.windows.remove(&id);
        if self.focused == Some(id) {
            self.focused = None;
        }

        #[cfg(debug_assertions)]
        self.debug_check_invariants();
        entry
    }

    /// Open windows in creation order.
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Marks the surface shown and hands back any deferred action.
    pub fn mark_ready(&mut self, id: WindowId) -> Option<DeferredAction> {
        let entry = self.windows.get_mut(&id)?;
        entry.visible = true;
        entry.deferred.take()
    }

    pub fn set_focused(&mut self, id: WindowId) {
        if self.windows.contains_key(&id) {
            self.focused = Some(id);
        }
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    /// Sends a message to a live window. Returns `false` if the window is gone
    /// or its view has hung up.
    pub fn deliver(&self, id: WindowId, message: WindowMessage) -> bool {
        let Some(entry) = self.windows.get(&id) else {
            tracing::debug!(window = %id, message = ?message, "dropping message for closed window");
            return false;
        };
        if entry.link.send(message).is_err() {
            tracing::debug!(window = %id, "window view disconnected");
            return false;
        }
        true
    }

    #[cfg(debug_assertions)]
    fn debug_check_invariants(&self) {
        for (id, entry) in &self.windows {
            debug_assert_eq!(*id, entry.id, "WindowRegistry: entry keyed under wrong id");
            debug_assert!(
                id.get() <= self.next_id,
                "WindowRegistry: id {id} beyond allocator"
            );
        }
        if let Some(focused) = self.focused {
            debug_assert!(
                self.windows.contains_key(&focused),
                "WindowRegistry: focused window {focused} not registered"
            );
        }
    }
}
