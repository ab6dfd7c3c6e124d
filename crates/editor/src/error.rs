// Chunk: docs/chunks/document_errors - Typed document errors
//!
//! Error taxonomy for document operations.
//!
//! - [`DocumentError::Io`] aborts the operation that hit it. Bindings and
//!   dirty state are left exactly as they were before the operation started.
//! - [`DocumentError::Watch`] degrades external-change detection only; the
//!   window stays usable for editing and saving.
//! - [`DocumentError::UserCancelled`] is not a failure. It is the normal
//!   negative outcome of a picker and resolves to a no-op.

use std::io;
use std::path::PathBuf;

use shadow_edit_protocol::Operation;
use thiserror::Error;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot watch {}: {message}", .path.display())]
    Watch { path: PathBuf, message: String },
    #[error("cancelled by user")]
    UserCancelled,
    #[error("unsupported file type: {}", .path.display())]
    UnsupportedFileType { path: PathBuf },
}

impl DocumentError {
    pub fn io(operation: Operation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        DocumentError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn watch(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DocumentError::Watch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The operation to name in a user-facing notification, if this error has one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            DocumentError::Io { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// The path involved, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            DocumentError::Io { path, .. }
            | DocumentError::Watch { path, .. }
            | DocumentError::UnsupportedFileType { path } => Some(path),
            DocumentError::UserCancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DocumentError::UserCancelled)
    }
}
