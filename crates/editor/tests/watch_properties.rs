// Chunk: docs/chunks/watch_pipeline - Property tests for watch ownership and dirty tracking

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use shadow_edit::config::EditorConfig;
use shadow_edit::document_view::DocumentView;
use shadow_edit::file_watch_registry::{
    FileWatchRegistry, WatchCallback, WatchEventKind, WatchNotice,
};
use shadow_edit::manual_watch::ManualWatchFactory;
use shadow_edit::protocol::{DocumentOrigin, WindowId, WindowMessage};

const PROPTEST_CASES: u32 = 128;

const PATHS: [&str; 3] = ["/docs/a.md", "/docs/b.md", "/docs/c.md"];

#[derive(Clone, Debug)]
enum WatchOp {
    Start { window: u64, path: usize },
    FailedStart { window: u64, path: usize },
    Stop { window: u64 },
}

fn arb_watch_op() -> impl Strategy<Value = WatchOp> {
    prop_oneof![
        6 => (1u64..=4, 0usize..PATHS.len()).prop_map(|(window, path)| WatchOp::Start { window, path }),
        1 => (1u64..=4, 0usize..PATHS.len())
            .prop_map(|(window, path)| WatchOp::FailedStart { window, path }),
        3 => (1u64..=4).prop_map(|window| WatchOp::Stop { window }),
    ]
}

#[derive(Clone, Debug)]
enum ViewOp {
    Edit(String),
    Revert,
    Ready { content: String, origin: DocumentOrigin },
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", "# Hi", "# Hi there", "draft", "é中😀"]).prop_map(String::from)
}

fn arb_origin() -> impl Strategy<Value = DocumentOrigin> {
    prop_oneof![
        Just(DocumentOrigin::Opened),
        Just(DocumentOrigin::Saved),
        Just(DocumentOrigin::Reloaded),
    ]
}

fn arb_view_op() -> impl Strategy<Value = ViewOp> {
    prop_oneof![
        5 => arb_text().prop_map(ViewOp::Edit),
        1 => Just(ViewOp::Revert),
        2 => (arb_text(), arb_origin()).prop_map(|(content, origin)| ViewOp::Ready { content, origin }),
    ]
}

fn recording() -> (WatchCallback, Arc<Mutex<Vec<WatchNotice>>>) {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = notices.clone();
    let callback: WatchCallback = Arc::new(move |notice| sink.lock().unwrap().push(notice));
    (callback, notices)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    /// Every window has at most one live watch, and notices only ever come
    /// from the watch the registry currently holds for that window.
    #[test]
    fn watch_ownership_stays_injective(ops in prop::collection::vec(arb_watch_op(), 1..40)) {
        let (factory, handle) = ManualWatchFactory::new();
        let (callback, notices) = recording();
        let mut registry = FileWatchRegistry::new(Box::new(factory), callback);
        let mut model: BTreeMap<WindowId, PathBuf> = BTreeMap::new();

        for op in ops {
            match op {
                WatchOp::Start { window, path } => {
                    let path = PathBuf::from(PATHS[path]);
                    prop_assert!(registry.start_watching(WindowId(window), &path).is_ok());
                    model.insert(WindowId(window), path);
                }
                WatchOp::FailedStart { window, path } => {
                    handle.fail_next_start("no more watches");
                    prop_assert!(registry.start_watching(WindowId(window), Path::new(PATHS[path])).is_err());
                    model.remove(&WindowId(window));
                }
                WatchOp::Stop { window } => {
                    registry.stop_watching(WindowId(window));
                    model.remove(&WindowId(window));
                }
            }

            let mut live = handle.live_watches();
            live.sort();
            let expected: Vec<(WindowId, PathBuf)> =
                model.iter().map(|(w, p)| (*w, p.clone())).collect();
            prop_assert_eq!(live, expected);
            prop_assert_eq!(registry.watcher_count(), model.len());

            let ids: HashSet<_> = model.keys().filter_map(|w| registry.watcher_id(*w)).collect();
            prop_assert_eq!(ids.len(), model.len());
        }

        for path in PATHS {
            let fired = handle.fire(Path::new(path), WatchEventKind::Modified);
            let watching = model.values().filter(|p| p.as_path() == Path::new(path)).count();
            prop_assert_eq!(fired, watching);
        }
        for notice in notices.lock().unwrap().iter() {
            prop_assert!(registry.is_current(notice));
        }
    }

    /// The view is edited exactly when its buffer differs from its baseline,
    /// and it only reports transitions.
    #[test]
    fn view_dirty_flag_tracks_baseline(ops in prop::collection::vec(arb_view_op(), 1..40)) {
        let mut view = DocumentView::new(WindowId(1), &EditorConfig::default());
        let mut reported = false;

        for op in ops {
            let before = view.is_edited();
            let request = match op {
                ViewOp::Edit(text) => view.on_buffer_changed(text),
                ViewOp::Revert => view.on_revert(),
                ViewOp::Ready { content, origin } => view.handle_message(WindowMessage::DocumentReady {
                    path: PathBuf::from("/docs/a.md"),
                    content,
                    origin,
                }),
            };

            prop_assert_eq!(view.is_edited(), view.buffer() != view.baseline());
            prop_assert_eq!(request.is_some(), before != view.is_edited());
            if request.is_some() {
                reported = view.is_edited();
            }
            prop_assert_eq!(reported, view.is_edited());
            prop_assert_eq!(view.affordances().save_enabled, view.is_edited());
        }
    }
}
