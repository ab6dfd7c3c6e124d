// Chunk: docs/chunks/confirm_request - Presenter-side confirmation state
//!
//! Interaction state for presenting a [`ConfirmRequest`].
//!
//! Pure state with no I/O, so any presenter (the console one here, or a
//! native sheet) can drive it from its own key events:
//! - **Tab/Right**: select the next option
//! - **Left**: select the previous option
//! - **Enter**: answer with the selected option
//! - **Escape**: dismiss, which answers with the request's cancel option
//!
//! The request's default option starts selected, so a bare Enter picks it.

use shadow_edit_protocol::{ConfirmRequest, ConfirmResponse};

/// Keys a confirmation dialog reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKey {
    Tab,
    Left,
    Right,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Still open, waiting for input.
    Pending,
    Answered(ConfirmResponse),
}

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub request: ConfirmRequest,
    pub selected: usize,
}

impl ConfirmDialog {
    pub fn new(request: ConfirmRequest) -> Self {
        let selected = request.default_index().unwrap_or(0);
        Self { request, selected }
    }

    pub fn handle_key(&mut self, key: DialogKey) -> ConfirmOutcome {
        let count = self.request.options.len();
        match key {
            DialogKey::Tab | DialogKey::Right => {
                if count > 0 {
                    self.selected = (self.selected + 1) % count;
                }
                ConfirmOutcome::Pending
            }
            DialogKey::Left => {
                if count > 0 {
                    self.selected = (self.selected + count - 1) % count;
                }
                ConfirmOutcome::Pending
            }
            DialogKey::Enter => ConfirmOutcome::Answered(ConfirmResponse(self.selected)),
            DialogKey::Escape => ConfirmOutcome::Answered(self.request.dismissal()),
        }
    }

    /// Answers with option `index` directly, if it exists.
    pub fn choose(&mut self, index: usize) -> ConfirmOutcome {
        if index < self.request.options.len() {
            self.selected = index;
            ConfirmOutcome::Answered(ConfirmResponse(index))
        } else {
            ConfirmOutcome::Pending
        }
    }

    /// Plain-text rendering: title, message, then one numbered line per option
    /// with the selection marked.
    pub fn render_text(&self) -> String {
        let mut out = format!("{}\n{}\n", self.request.title, self.request.message);
        for (i, option) in self.request.options.iter().enumerate() {
            let cursor = if i == self.selected { '>' } else { ' ' };
            out.push_str(&format!("{cursor} [{i}] {}\n", option.label));
        }
        out
    }
}
