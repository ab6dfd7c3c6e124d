// Chunk: docs/chunks/watch_pipeline - Deterministic watch backend
//!
//! Deterministic [`WatchFactory`] for tests.
//!
//! Nothing here touches the OS. Tests keep a [`ManualWatchHandle`] after the
//! factory has been moved into the coordinator and use it to inject notices,
//! inspect which watches are live, and force the next start to fail.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shadow_edit_protocol::WindowId;

use crate::error::{DocumentError, DocumentResult};
use crate::file_watch_registry::{
    ActiveWatch, WatchCallback, WatchEventKind, WatchFactory, WatchTarget,
};

struct Registered {
    target: WatchTarget,
    live: Arc<AtomicBool>,
    on_event: WatchCallback,
}

#[derive(Default)]
struct State {
    watches: Vec<Registered>,
    fail_next: Option<String>,
    starts: usize,
}

pub struct ManualWatchFactory {
    state: Arc<Mutex<State>>,
}

/// Cloneable handle onto a [`ManualWatchFactory`].
#[derive(Clone)]
pub struct ManualWatchHandle {
    state: Arc<Mutex<State>>,
}

struct ManualWatch {
    live: Arc<AtomicBool>,
}

impl ActiveWatch for ManualWatch {}

impl Drop for ManualWatch {
    fn drop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ManualWatchFactory {
    pub fn new() -> (Self, ManualWatchHandle) {
        let state = Arc::new(Mutex::new(State::default()));
        (
            Self {
                state: state.clone(),
            },
            ManualWatchHandle { state },
        )
    }
}

impl WatchFactory for ManualWatchFactory {
    fn start(
        &mut self,
        target: WatchTarget,
        on_event: WatchCallback,
    ) -> DocumentResult<Box<dyn ActiveWatch>> {
        let mut state = lock(&self.state);
        state.starts += 1;
        if let Some(message) = state.fail_next.take() {
            return Err(DocumentError::watch(&target.path, message));
        }

        state.watches.retain(|w| w.live.load(Ordering::SeqCst));
        let live = Arc::new(AtomicBool::new(true));
        state.watches.push(Registered {
            target,
            live: live.clone(),
            on_event,
        });
        Ok(Box::new(ManualWatch { live }))
    }
}

impl ManualWatchHandle {
    /// `(window, path)` of every watch that has not been dropped, in start order.
    pub fn live_watches(&self) -> Vec<(WindowId, PathBuf)> {
        lock(&self.state)
            .watches
            .iter()
            .filter(|w| w.live.load(Ordering::SeqCst))
            .map(|w| (w.target.window, w.target.path.clone()))
            .collect()
    }

    /// Delivers `kind` to every live watch on `path`. Returns how many fired.
    pub fn fire(&self, path: &Path, kind: WatchEventKind) -> usize {
        let targets: Vec<(WatchTarget, WatchCallback)> = lock(&self.state)
            .watches
            .iter()
            .filter(|w| w.live.load(Ordering::SeqCst) && w.target.path == path)
            .map(|w| (w.target.clone(), w.on_event.clone()))
            .collect();

        // Callbacks run without the lock held.
        for (target, on_event) in &targets {
            on_event(target.notice(kind.clone()));
        }
        targets.len()
    }

    /// Makes the next `start` fail with a watch error.
    pub fn fail_next_start(&self, message: impl Into<String>) {
        lock(&self.state).fail_next = Some(message.into());
    }

    /// Total number of start attempts, failed ones included.
    pub fn start_count(&self) -> usize {
        lock(&self.state).starts
    }
}
