// Chunk: docs/chunks/document_io - Reading and writing documents
//!
//! Filesystem access for documents.
//!
//! Only the coordinator calls these. Content is UTF-8 text; a file that is not
//! valid UTF-8 is reported as a read failure rather than lossily decoded, so a
//! later save can never silently rewrite bytes the user never saw.

use std::fs;
use std::io;
use std::path::Path;

use shadow_edit_protocol::Operation;

use crate::error::{DocumentError, DocumentResult};

/// Extensions accepted by drag-and-drop.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "text"];

pub fn read_document(path: &Path) -> DocumentResult<String> {
    let bytes = fs::read(path).map_err(|e| DocumentError::io(Operation::Read, path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        DocumentError::io(
            Operation::Read,
            path,
            io::Error::new(io::ErrorKind::InvalidData, e.utf8_error()),
        )
    })
}

pub fn write_document(path: &Path, content: &str) -> DocumentResult<()> {
    fs::write(path, content).map_err(|e| DocumentError::io(Operation::Write, path, e))
}

pub fn export_html(path: &Path, html: &str) -> DocumentResult<()> {
    fs::write(path, html).map_err(|e| DocumentError::io(Operation::ExportHtml, path, e))
}

/// True if `path` has one of [`DOCUMENT_EXTENSIONS`] (case-insensitive).
pub fn is_supported_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
