// Chunk: docs/chunks/watch_pipeline - Per-window file watching
//!
//! Per-window file watching.
//!
//! Each bound window owns at most one live watch on its bound path. Starting a
//! watch for a window always tears down the previous one first, so the mapping
//! from windows to watchers stays injective across open, rebind and close.
//!
//! Every watch gets a fresh [`WatcherId`] and every notice it produces carries
//! that id. Notices from a watch that has since been replaced or stopped can
//! still be sitting in the coordinator's queue; [`FileWatchRegistry::is_current`]
//! lets the coordinator discard them.
//!
//! # Backends
//!
//! The OS backend lives behind [`WatchFactory`]. [`NotifyWatchFactory`] is the
//! real one: it watches the parent directory non-recursively (FSEvents and
//! inotify both behave better on directories, and editors that save by
//! rename-over replace the file's inode) and filters events down to the target
//! path. Tests use [`crate::manual_watch::ManualWatchFactory`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use shadow_edit_protocol::WindowId;

use crate::error::{DocumentError, DocumentResult};
use crate::file_change_debouncer::FileChangeDebouncer;

/// Identity of one watch. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(pub u64);

/// What happened to a watched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEventKind {
    /// Content may have changed (write, create, rename-over).
    Modified,
    /// The file was deleted or renamed away.
    Removed,
    /// The backend reported an error; the watch may be dead.
    Failed(String),
}

/// A debounced notification from one watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchNotice {
    pub window: WindowId,
    pub watcher: WatcherId,
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

/// Everything a backend needs to start a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub window: WindowId,
    pub watcher: WatcherId,
    pub path: PathBuf,
}

impl WatchTarget {
    pub fn notice(&self, kind: WatchEventKind) -> WatchNotice {
        WatchNotice {
            window: self.window,
            watcher: self.watcher,
            path: self.path.clone(),
            kind,
        }
    }
}

pub type WatchCallback = Arc<dyn Fn(WatchNotice) + Send + Sync>;

/// A live watch. Dropping it stops the watch.
pub trait ActiveWatch: Send {}

/// Creates OS-level watches.
pub trait WatchFactory: Send {
    fn start(
        &mut self,
        target: WatchTarget,
        on_event: WatchCallback,
    ) -> DocumentResult<Box<dyn ActiveWatch>>;
}

struct WatchEntry {
    id: WatcherId,
    path: PathBuf,
    _active: Box<dyn ActiveWatch>,
}

// =============================================================================
// Registry
// =============================================================================

/// Window to watcher map, owned by the coordinator.
pub struct FileWatchRegistry {
    factory: Box<dyn WatchFactory>,
    on_event: WatchCallback,
    watchers: HashMap<WindowId, WatchEntry>,
    next_id: u64,
}

impl FileWatchRegistry {
    pub fn new(factory: Box<dyn WatchFactory>, on_event: WatchCallback) -> Self {
        Self {
            factory,
            on_event,
            watchers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Replaces whatever watch `window` had with a new one on `path`.
    ///
    /// The old watch is stopped even if the new one fails to start, so on
    /// error the window is left unwatched.
    pub fn start_watching(&mut self, window: WindowId, path: &Path) -> DocumentResult<WatcherId> {
        self.stop_watching(window);

        let id = WatcherId(self.next_id);
        self.next_id += 1;

        let target = WatchTarget {
            window,
            watcher: id,
            path: path.to_path_buf(),
        };
        let active = self.factory.start(target, self.on_event.clone())?;
        self.watchers.insert(
            window,
            WatchEntry {
                id,
                path: path.to_path_buf(),
                _active: active,
            },
        );
        tracing::debug!(%window, watcher = id.0, path = %path.display(), "watch started");
        Ok(id)
    }

    /// Stops the window's watch. Idempotent.
    pub fn stop_watching(&mut self, window: WindowId) {
        if let Some(watcher) = self.watchers.remove(&window) {
            tracing::debug!(%window, watcher = watcher.id.0, "watch stopped");
        }
    }

    pub fn watcher_id(&self, window: WindowId) -> Option<WatcherId> {
        self.watchers.get(&window).map(|w| w.id)
    }

    pub fn watched_path(&self, window: WindowId) -> Option<&Path> {
        self.watchers.get(&window).map(|w| w.path.as_path())
    }

    /// True if `notice` came from the window's current watch.
    pub fn is_current(&self, notice: &WatchNotice) -> bool {
        self.watcher_id(notice.window) == Some(notice.watcher)
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

// =============================================================================
// notify backend
// =============================================================================

/// Watches through `notify`'s recommended OS backend.
pub struct NotifyWatchFactory {
    debounce_ms: u64,
}

impl NotifyWatchFactory {
    pub fn new(debounce_ms: u64) -> Self {
        Self { debounce_ms }
    }
}

struct NotifyWatch {
    _watcher: RecommendedWatcher,
    // Disconnecting this stops the drain thread.
    _stop_tx: Sender<()>,
}

impl ActiveWatch for NotifyWatch {}

impl WatchFactory for NotifyWatchFactory {
    fn start(
        &mut self,
        target: WatchTarget,
        on_event: WatchCallback,
    ) -> DocumentResult<Box<dyn ActiveWatch>> {
        let canonical = normalize(&target.path);
        let dir = match canonical.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (event_tx, event_rx) = unbounded::<notify::Result<Event>>();
        let (stop_tx, stop_rx) = unbounded::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = event_tx.send(res);
            },
            Config::default(),
        )
        .map_err(|e| DocumentError::watch(&target.path, format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                DocumentError::watch(&target.path, format!("failed to watch {}: {e}", dir.display()))
            })?;

        let debouncer = FileChangeDebouncer::new(self.debounce_ms);
        thread::Builder::new()
            .name(format!("watch-{}", target.window))
            .spawn(move || drain_events(target, canonical, debouncer, on_event, event_rx, stop_rx))
            .map_err(|e| DocumentError::watch(&dir, format!("failed to spawn watch thread: {e}")))?;

        Ok(Box::new(NotifyWatch {
            _watcher: watcher,
            _stop_tx: stop_tx,
        }))
    }
}

/// Flush interval for the debouncer while no events arrive.
const TICK: Duration = Duration::from_millis(50);

fn drain_events(
    target: WatchTarget,
    canonical: PathBuf,
    mut debouncer: FileChangeDebouncer,
    on_event: WatchCallback,
    event_rx: Receiver<notify::Result<Event>>,
    stop_rx: Receiver<()>,
) {
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(event_rx) -> msg => match msg {
                Ok(Ok(event)) => {
                    for (path, kind) in classify(&event) {
                        if normalize(&path) == canonical {
                            debouncer.register(canonical.clone(), kind, Instant::now());
                        }
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(path = %target.path.display(), error = %e, "watch backend error");
                    on_event(target.notice(WatchEventKind::Failed(e.to_string())));
                }
                Err(_) => break,
            },
            default(TICK) => {}
        }

        for (_, kind) in debouncer.flush_ready(Instant::now()) {
            on_event(target.notice(kind));
        }
    }
}

/// Maps a raw notify event onto per-path kinds. Access and metadata-only
/// events are dropped.
fn classify(event: &Event) -> Vec<(PathBuf, WatchEventKind)> {
    let kind = match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths = [from, to]
            let mut out = Vec::new();
            if let Some(from) = event.paths.first() {
                out.push((from.clone(), WatchEventKind::Removed));
            }
            if let Some(to) = event.paths.get(1) {
                out.push((to.clone(), WatchEventKind::Modified));
            }
            return out;
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
            WatchEventKind::Removed
        }
        EventKind::Modify(ModifyKind::Name(_))
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Create(_) => WatchEventKind::Modified,
        _ => return Vec::new(),
    };
    event.paths.iter().map(|p| (p.clone(), kind.clone())).collect()
}

/// Canonical form of a path that may no longer exist: canonicalize the parent
/// and re-attach the file name.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}
