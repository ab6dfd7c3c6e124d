// Chunk: docs/chunks/window_protocol - Window identity

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to one editor surface.
///
/// Identifiers are allocated by the coordinator and never reused within a
/// session, so a stale id left over from a closed window can be detected by a
/// simple registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl WindowId {
    /// Returns the raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}
