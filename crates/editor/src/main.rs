// Chunk: docs/chunks/console_frontend - Binary entry point
//!
//! `shadow-edit [FILE...]`
//!
//! Opens each file in its own window (or one untitled window if none are
//! given), watches them for external changes and runs until the last window
//! closes, `:quit` is typed, or stdin reaches EOF.

use std::path::PathBuf;
use std::process::ExitCode;

use shadow_edit::config::load_config;
use shadow_edit::console::console;
use shadow_edit::coordinator::Coordinator;
use shadow_edit::drain_loop::EventDrainLoop;
use shadow_edit::event_channel::create_event_channel;
use shadow_edit::file_watch_registry::NotifyWatchFactory;
use shadow_edit::logging::init_logging;
use shadow_edit::recent_documents::{recent_file_path, RecentDocuments};

fn main() -> ExitCode {
    let config = load_config();
    init_logging(&config.logging);

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let recent = match recent_file_path() {
        Some(store) => RecentDocuments::load(store, config.recent_documents_limit),
        None => RecentDocuments::in_memory(config.recent_documents_limit),
    };

    let (sender, receiver) = create_event_channel();
    let (host, presenter, input) = console(&config, recent, sender.clone());
    let watch_factory = NotifyWatchFactory::new(config.debounce_ms);

    let mut coordinator = Coordinator::new(
        config,
        Box::new(watch_factory),
        Box::new(host),
        Box::new(presenter),
        sender,
    );

    if paths.is_empty() {
        coordinator.create_window();
    } else {
        for path in paths {
            coordinator.open_in_new_window(path);
        }
    }

    if let Err(e) = input.spawn() {
        tracing::error!(error = %e, "failed to start console input");
        return ExitCode::FAILURE;
    }

    EventDrainLoop::new(coordinator, receiver).run();
    ExitCode::SUCCESS
}
