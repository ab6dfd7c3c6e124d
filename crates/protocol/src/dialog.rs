// Chunk: docs/chunks/confirm_request - Generic confirmation request value
//!
//! Dialog values shared by every presenter.
//!
//! Every blocking confirmation in the editor (close with unsaved edits, open
//! over unsaved edits, external change, deleted file) is described by one
//! [`ConfirmRequest`] and answered by one [`ConfirmResponse`]. Presenters never
//! need to know which of those situations they are showing.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Index of the option that declines a two-choice confirmation.
///
/// Any response other than this one is treated as "proceed". Dismissing a
/// dialog (Escape, closing the sheet) reports this index.
pub const CANCEL_RESPONSE: usize = 1;

/// Identifies one outstanding dialog or picker so its answer can be routed
/// back to whoever asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogTicket(pub u64);

impl fmt::Display for DialogTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog#{}", self.0)
    }
}

/// Visual severity of a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DialogKind {
    #[default]
    Warning,
    Info,
}

/// One button of a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOption {
    pub label: String,
    /// Fires on Enter.
    pub is_default: bool,
    /// Fires when the dialog is dismissed without an explicit choice.
    pub is_cancel: bool,
}

/// A blocking confirmation: a title, a message and an ordered list of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    pub options: Vec<ConfirmOption>,
}

impl ConfirmRequest {
    /// Builds the standard two-option warning: option 0 proceeds and is the
    /// default, option 1 declines and is the cancel id.
    pub fn two_choice(
        title: impl Into<String>,
        message: impl Into<String>,
        proceed_label: impl Into<String>,
        cancel_label: impl Into<String>,
    ) -> Self {
        Self {
            kind: DialogKind::Warning,
            title: title.into(),
            message: message.into(),
            options: vec![
                ConfirmOption {
                    label: proceed_label.into(),
                    is_default: true,
                    is_cancel: false,
                },
                ConfirmOption {
                    label: cancel_label.into(),
                    is_default: false,
                    is_cancel: true,
                },
            ],
        }
    }

    /// Index of the option fired by Enter.
    pub fn default_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_default)
    }

    /// Index of the option fired by dismissal.
    pub fn cancel_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_cancel)
    }

    /// The response a presenter reports when the dialog is dismissed.
    pub fn dismissal(&self) -> ConfirmResponse {
        ConfirmResponse(self.cancel_index().unwrap_or(CANCEL_RESPONSE))
    }
}

/// The index of the option the user chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmResponse(pub usize);

impl ConfirmResponse {
    /// Returns true unless the response is exactly [`CANCEL_RESPONSE`].
    pub fn is_proceed(self) -> bool {
        self.0 != CANCEL_RESPONSE
    }
}

/// A named set of file extensions (without the leading dot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Returns true if `ext` (without dot, any case) is in this filter.
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Parameters for a single-file open picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDialogOptions {
    pub title: String,
    pub filters: Vec<FileFilter>,
}

impl OpenDialogOptions {
    /// The document picker: Markdown and plain text.
    pub fn documents() -> Self {
        Self {
            title: "Open Document".to_string(),
            filters: vec![
                FileFilter::new("Markdown", &["md", "markdown"]),
                FileFilter::new("Text", &["txt"]),
            ],
        }
    }

    /// Returns true if any filter accepts `ext`.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.filters.iter().any(|f| f.matches_extension(ext))
    }
}

/// Parameters for a save picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDialogOptions {
    pub title: String,
    pub default_path: Option<PathBuf>,
    pub filters: Vec<FileFilter>,
    pub button_label: String,
}

impl SaveDialogOptions {
    /// Save a Markdown document, starting in `documents_dir`.
    pub fn markdown(documents_dir: Option<PathBuf>) -> Self {
        Self {
            title: "Save Markdown".to_string(),
            default_path: documents_dir,
            filters: vec![FileFilter::new("Markdown", &["md", "markdown"])],
            button_label: "Save".to_string(),
        }
    }

    /// Export rendered HTML, starting in `documents_dir`.
    pub fn html(documents_dir: Option<PathBuf>) -> Self {
        Self {
            title: "Export HTML".to_string(),
            default_path: documents_dir,
            filters: vec![FileFilter::new("HTML", &["html", "htm"])],
            button_label: "Export".to_string(),
        }
    }
}
