// Chunk: docs/chunks/conflict_resolution - Single-prompt conflict gate
//!
//! Conflict resolution state.
//!
//! Four situations need the user's decision before the coordinator may act:
//!
//! | Trigger                       | Prompts when      | Proceed        | Cancel (index 1)  |
//! |-------------------------------|-------------------|----------------|-------------------|
//! | close with unsaved edits      | dirty             | close          | keep window       |
//! | open over unsaved edits       | dirty             | replace buffer | ignore the open   |
//! | external change               | always            | reload         | keep buffer       |
//! | bound file removed            | always            | save as        | keep buffer       |
//!
//! A window has at most one prompt outstanding. Any trigger arriving while a
//! prompt is pending for the same window is dropped, which is what keeps a
//! burst of change notifications from stacking dialogs. Closing a clean
//! window is the exception: it always proceeds.
//!
//! The resolver only decides. It performs no I/O and sends no messages; the
//! coordinator turns a [`Gate`] or [`Resolution`] into effects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use shadow_edit_protocol::{ConfirmRequest, ConfirmResponse, DialogTicket, WindowId};

/// Something that needs a decision before it may happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictTrigger {
    CloseWithUnsavedEdits,
    /// `content` has already been read from `path`.
    OpenOverUnsavedEdits { path: PathBuf, content: String },
    ExternalChange { path: PathBuf },
    FileRemoved { path: PathBuf },
}

/// Per-window conflict state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Clean,
    Dirty,
    /// `prior` is the state the window returns to once the prompt is answered.
    PromptPending { prior: PriorState },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorState {
    Clean,
    Dirty,
}

/// What the coordinator should do with a trigger right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// No confirmation needed.
    Proceed,
    /// Present `request`; the answer comes back under `ticket`.
    Prompt {
        ticket: DialogTicket,
        request: ConfirmRequest,
    },
    /// A prompt is already pending for this window; the trigger is dropped.
    Suppressed,
}

/// The decided outcome of an answered prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Close { window: WindowId },
    KeepOpen { window: WindowId },
    Open {
        window: WindowId,
        path: PathBuf,
        content: String,
    },
    IgnoreOpen { window: WindowId },
    Reload { window: WindowId, path: PathBuf },
    IgnoreChange { window: WindowId },
    SaveAs { window: WindowId },
    KeepDeleted { window: WindowId },
}

impl Resolution {
    pub fn window(&self) -> WindowId {
        match self {
            Resolution::Close { window }
            | Resolution::KeepOpen { window }
            | Resolution::Open { window, .. }
            | Resolution::IgnoreOpen { window }
            | Resolution::Reload { window, .. }
            | Resolution::IgnoreChange { window }
            | Resolution::SaveAs { window }
            | Resolution::KeepDeleted { window } => *window,
        }
    }
}

struct PendingPrompt {
    window: WindowId,
    trigger: ConflictTrigger,
}

#[derive(Default)]
pub struct ConflictResolver {
    by_ticket: HashMap<DialogTicket, PendingPrompt>,
    by_window: HashMap<WindowId, (DialogTicket, PriorState)>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether `trigger` may proceed for `window`, needs a prompt, or
    /// must be dropped. `ticket` is used only if a prompt is opened.
    pub fn request(
        &mut self,
        window: WindowId,
        dirty: bool,
        trigger: ConflictTrigger,
        ticket: DialogTicket,
    ) -> Gate {
        // A clean window has nothing to lose. Its pending prompt, if any, is
        // dropped along with it by `forget_window`.
        if !dirty && trigger == ConflictTrigger::CloseWithUnsavedEdits {
            return Gate::Proceed;
        }
        if let Some((pending, _)) = self.by_window.get(&window) {
            tracing::debug!(%window, pending = %pending, trigger = ?trigger, "prompt already pending; trigger dropped");
            return Gate::Suppressed;
        }

        let needs_prompt = match trigger {
            ConflictTrigger::CloseWithUnsavedEdits | ConflictTrigger::OpenOverUnsavedEdits { .. } => {
                dirty
            }
            ConflictTrigger::ExternalChange { .. } | ConflictTrigger::FileRemoved { .. } => true,
        };
        if !needs_prompt {
            return Gate::Proceed;
        }

        let request = prompt_for(&trigger, dirty);
        let prior = if dirty { PriorState::Dirty } else { PriorState::Clean };
        self.by_window.insert(window, (ticket, prior));
        self.by_ticket.insert(ticket, PendingPrompt { window, trigger });
        Gate::Prompt { ticket, request }
    }

    /// Consumes the answer to `ticket`. Returns `None` for unknown or already
    /// answered tickets.
    pub fn resolve(&mut self, ticket: DialogTicket, response: ConfirmResponse) -> Option<Resolution> {
        let PendingPrompt { window, trigger } = self.by_ticket.remove(&ticket)?;
        self.by_window.remove(&window);

        let proceed = response.is_proceed();
        let resolution = match trigger {
            ConflictTrigger::CloseWithUnsavedEdits if proceed => Resolution::Close { window },
            ConflictTrigger::CloseWithUnsavedEdits => Resolution::KeepOpen { window },
            ConflictTrigger::OpenOverUnsavedEdits { path, content } if proceed => {
                Resolution::Open {
                    window,
                    path,
                    content,
                }
            }
            ConflictTrigger::OpenOverUnsavedEdits { .. } => Resolution::IgnoreOpen { window },
            ConflictTrigger::ExternalChange { path } if proceed => Resolution::Reload { window, path },
            ConflictTrigger::ExternalChange { .. } => Resolution::IgnoreChange { window },
            ConflictTrigger::FileRemoved { .. } if proceed => Resolution::SaveAs { window },
            ConflictTrigger::FileRemoved { .. } => Resolution::KeepDeleted { window },
        };
        Some(resolution)
    }

    /// Drops any pending prompt for a window that is going away.
    pub fn forget_window(&mut self, window: WindowId) {
        if let Some((ticket, _)) = self.by_window.remove(&window) {
            self.by_ticket.remove(&ticket);
        }
    }

    pub fn is_pending(&self, window: WindowId) -> bool {
        self.by_window.contains_key(&window)
    }

    pub fn state(&self, window: WindowId, dirty: bool) -> DocumentState {
        match self.by_window.get(&window) {
            Some((_, prior)) => DocumentState::PromptPending { prior: *prior },
            None if dirty => DocumentState::Dirty,
            None => DocumentState::Clean,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn prompt_for(trigger: &ConflictTrigger, dirty: bool) -> ConfirmRequest {
    match trigger {
        ConflictTrigger::CloseWithUnsavedEdits => ConfirmRequest::two_choice(
            "Unsaved Changes",
            "This document has unsaved changes. Close the window and discard them?",
            "Discard and Close",
            "Cancel",
        ),
        ConflictTrigger::OpenOverUnsavedEdits { path, .. } => ConfirmRequest::two_choice(
            "Unsaved Changes",
            format!(
                "Opening {} will discard the unsaved changes in this window.",
                display_name(path)
            ),
            "Open Anyway",
            "Cancel",
        ),
        ConflictTrigger::ExternalChange { path } => {
            let mut message = format!(
                "{} was changed by another program. Reload it from disk?",
                display_name(path)
            );
            if dirty {
                message.push_str(" Your unsaved changes will be lost.");
            }
            ConfirmRequest::two_choice("File Changed", message, "Reload", "Ignore")
        }
        ConflictTrigger::FileRemoved { path } => ConfirmRequest::two_choice(
            "File Deleted",
            format!(
                "{} was deleted or moved. Save this document to a new location?",
                display_name(path)
            ),
            "Save As…",
            "Ignore",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: WindowId = WindowId(1);

    fn change() -> ConflictTrigger {
        ConflictTrigger::ExternalChange {
            path: PathBuf::from("/notes/notes.md"),
        }
    }

    #[test]
    fn test_close_clean_proceeds_without_prompt() {
        let mut resolver = ConflictResolver::new();
        let gate = resolver.request(W, false, ConflictTrigger::CloseWithUnsavedEdits, DialogTicket(1));
        assert_eq!(gate, Gate::Proceed);
        assert!(!resolver.is_pending(W));
    }

    #[test]
    fn test_close_dirty_prompts_with_discard_default() {
        let mut resolver = ConflictResolver::new();
        let gate = resolver.request(W, true, ConflictTrigger::CloseWithUnsavedEdits, DialogTicket(1));
        let Gate::Prompt { ticket, request } = gate else {
            panic!("expected prompt");
        };
        assert_eq!(ticket, DialogTicket(1));
        assert_eq!(request.options[0].label, "Discard and Close");
        assert_eq!(request.default_index(), Some(0));
        assert_eq!(request.cancel_index(), Some(1));
        assert_eq!(
            resolver.state(W, true),
            DocumentState::PromptPending { prior: PriorState::Dirty }
        );
    }

    #[test]
    fn test_external_change_prompts_even_when_clean() {
        let mut resolver = ConflictResolver::new();
        let gate = resolver.request(W, false, change(), DialogTicket(1));
        assert!(matches!(gate, Gate::Prompt { .. }));
    }

    #[test]
    fn test_second_trigger_while_pending_is_suppressed() {
        let mut resolver = ConflictResolver::new();
        resolver.request(W, false, change(), DialogTicket(1));
        assert_eq!(resolver.request(W, false, change(), DialogTicket(2)), Gate::Suppressed);
        assert_eq!(
            resolver.request(W, true, ConflictTrigger::CloseWithUnsavedEdits, DialogTicket(3)),
            Gate::Suppressed
        );
        // The suppressed tickets were never registered.
        assert_eq!(resolver.resolve(DialogTicket(2), ConfirmResponse(0)), None);
    }

    #[test]
    fn test_clean_close_proceeds_while_prompt_pending() {
        let mut resolver = ConflictResolver::new();
        resolver.request(W, false, change(), DialogTicket(1));
        assert_eq!(
            resolver.request(W, false, ConflictTrigger::CloseWithUnsavedEdits, DialogTicket(2)),
            Gate::Proceed
        );

        resolver.forget_window(W);
        assert!(!resolver.is_pending(W));
        assert_eq!(resolver.resolve(DialogTicket(1), ConfirmResponse(0)), None);
    }

    #[test]
    fn test_other_windows_are_independent() {
        let mut resolver = ConflictResolver::new();
        resolver.request(W, false, change(), DialogTicket(1));
        let gate = resolver.request(WindowId(2), false, change(), DialogTicket(2));
        assert!(matches!(gate, Gate::Prompt { .. }));
    }

    #[test]
    fn test_resolution_mapping() {
        let cases = vec![
            (ConflictTrigger::CloseWithUnsavedEdits, 0, Resolution::Close { window: W }),
            (ConflictTrigger::CloseWithUnsavedEdits, 1, Resolution::KeepOpen { window: W }),
            (
                ConflictTrigger::OpenOverUnsavedEdits {
                    path: PathBuf::from("/b.md"),
                    content: "b".into(),
                },
                0,
                Resolution::Open {
                    window: W,
                    path: PathBuf::from("/b.md"),
                    content: "b".into(),
                },
            ),
            (
                ConflictTrigger::OpenOverUnsavedEdits {
                    path: PathBuf::from("/b.md"),
                    content: "b".into(),
                },
                1,
                Resolution::IgnoreOpen { window: W },
            ),
            (
                change(),
                0,
                Resolution::Reload {
                    window: W,
                    path: PathBuf::from("/notes/notes.md"),
                },
            ),
            (change(), 1, Resolution::IgnoreChange { window: W }),
            (
                ConflictTrigger::FileRemoved {
                    path: PathBuf::from("/a.md"),
                },
                0,
                Resolution::SaveAs { window: W },
            ),
            (
                ConflictTrigger::FileRemoved {
                    path: PathBuf::from("/a.md"),
                },
                1,
                Resolution::KeepDeleted { window: W },
            ),
        ];

        for (i, (trigger, answer, expected)) in cases.into_iter().enumerate() {
            let mut resolver = ConflictResolver::new();
            let ticket = DialogTicket(i as u64);
            resolver.request(W, true, trigger, ticket);
            assert_eq!(resolver.resolve(ticket, ConfirmResponse(answer)), Some(expected));
            assert!(!resolver.is_pending(W));
        }
    }

    #[test]
    fn test_unusual_index_counts_as_proceed() {
        let mut resolver = ConflictResolver::new();
        resolver.request(W, false, change(), DialogTicket(1));
        let resolution = resolver.resolve(DialogTicket(1), ConfirmResponse(7));
        assert!(matches!(resolution, Some(Resolution::Reload { .. })));
    }

    #[test]
    fn test_state_returns_to_prior_after_answer() {
        let mut resolver = ConflictResolver::new();
        resolver.request(W, true, change(), DialogTicket(1));
        resolver.resolve(DialogTicket(1), ConfirmResponse(1));
        assert_eq!(resolver.state(W, true), DocumentState::Dirty);
    }

    #[test]
    fn test_forget_window_drops_pending_ticket() {
        let mut resolver = ConflictResolver::new();
        resolver.request(W, false, change(), DialogTicket(1));
        resolver.forget_window(W);
        assert!(!resolver.is_pending(W));
        assert_eq!(resolver.resolve(DialogTicket(1), ConfirmResponse(0)), None);
    }

    #[test]
    fn test_dirty_external_change_warns_about_loss() {
        let mut resolver = ConflictResolver::new();
        let Gate::Prompt { request, .. } = resolver.request(W, true, change(), DialogTicket(1)) else {
            panic!("expected prompt");
        };
        assert!(request.message.contains("notes.md"));
        assert!(request.message.contains("unsaved changes will be lost"));
    }
}
