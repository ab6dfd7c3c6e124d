// Chunk: docs/chunks/coordinator - Library interface
//!
//! shadow-edit: a multi-window Markdown editor core that keeps every open
//! document in sync with the file on disk.
//!
//! One [`coordinator::Coordinator`] owns all windows, file bindings and file
//! watches. Window views ([`document_view::DocumentView`]) track their own
//! dirty state and talk to the coordinator only through messages defined in
//! `shadow-edit-protocol`. When the file under a window changes on disk the
//! user is asked, exactly once per change burst, whether to reload.
//!
//! The platform is abstracted behind [`host::HostEnvironment`] and
//! [`host::ModalPresenter`]; [`console`] implements both for a terminal.

pub mod config;
pub mod confirm_dialog;
pub mod conflict;
pub mod console;
pub mod coordinator;
pub mod document_io;
pub mod document_view;
pub mod drain_loop;
pub mod editor_event;
pub mod error;
pub mod event_channel;
pub mod file_change_debouncer;
pub mod file_watch_registry;
pub mod host;
pub mod logging;
pub mod manual_watch;
pub mod recent_documents;
pub mod window_registry;

pub use shadow_edit_protocol as protocol;
