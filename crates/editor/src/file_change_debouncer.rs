// Chunk: docs/chunks/watch_pipeline - Debouncing of raw watcher events
//!
//! Debouncing for raw filesystem notifications.
//!
//! Editors and sync tools often save a file in several operations (truncate,
//! write, rename-over). Each path gets a quiet period; a new event for the same
//! path restarts the period and replaces the pending kind, so a burst that ends
//! in a removal is reported as a removal and a burst ending in a rewrite is
//! reported as a modification.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::file_watch_registry::WatchEventKind;

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

struct Pending {
    kind: WatchEventKind,
    last_seen: Instant,
}

/// Coalesces bursts of events per path. Pure data, no I/O: the watcher thread
/// calls `register` on each event and `flush_ready` on every tick.
pub struct FileChangeDebouncer {
    pending: HashMap<PathBuf, Pending>,
    window: Duration,
}

impl FileChangeDebouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            window: Duration::from_millis(debounce_ms),
        }
    }

    pub fn with_default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }

    /// Records an event. The latest kind for a path wins.
    pub fn register(&mut self, path: PathBuf, kind: WatchEventKind, now: Instant) {
        self.pending.insert(
            path,
            Pending {
                kind,
                last_seen: now,
            },
        );
    }

    /// Removes and returns every path whose quiet period has elapsed.
    pub fn flush_ready(&mut self, now: Instant) -> Vec<(PathBuf, WatchEventKind)> {
        let window = self.window;
        let ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, p)| now.duration_since(p.last_seen) >= window)
            .map(|(path, _)| path.clone())
            .collect();

        ready
            .into_iter()
            .filter_map(|path| {
                let pending = self.pending.remove(&path)?;
                Some((path, pending.kind))
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
