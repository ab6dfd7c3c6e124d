// Chunk: docs/chunks/host_boundary - Platform seams
//!
//! The coordinator's view of the platform.
//!
//! [`HostEnvironment`] owns native window surfaces and app-level chrome
//! (represented file, recent documents, menus). [`ModalPresenter`] shows
//! dialogs and pickers. Neither returns an answer synchronously: answers come
//! back as [`crate::editor_event::EditorEvent`]s carrying the ticket they were
//! issued with, so the coordinator thread never blocks on the user.

use std::path::Path;

use shadow_edit_protocol::{
    ConfirmRequest, DialogTicket, MenuState, OpenDialogOptions, SaveDialogOptions, WindowId,
};

use crate::event_channel::WindowEndpoint;

pub trait HostEnvironment: Send {
    /// Create a hidden surface for a new window. The surface's view talks to
    /// the coordinator through `endpoint` and reports `ContentReady` once loaded.
    fn create_surface(&mut self, endpoint: WindowEndpoint);

    fn show_surface(&mut self, window: WindowId);

    fn destroy_surface(&mut self, window: WindowId);

    fn set_represented_filename(&mut self, window: WindowId, path: &Path);

    fn add_recent_document(&mut self, path: &Path);

    fn refresh_menu(&mut self, state: &MenuState);
}

pub trait ModalPresenter: Send {
    /// Show a confirmation; answer with `DialogAnswered { ticket, .. }`.
    fn confirm(&mut self, window: WindowId, ticket: DialogTicket, request: ConfirmRequest);

    /// Show an open picker; answer with `PickerAnswered { ticket, .. }`.
    fn pick_open(&mut self, window: WindowId, ticket: DialogTicket, options: &OpenDialogOptions);

    /// Show a save picker; answer with `PickerAnswered { ticket, .. }`.
    fn pick_save(&mut self, window: WindowId, ticket: DialogTicket, options: &SaveDialogOptions);

    /// Show a blocking notice. No answer is expected.
    fn alert(&mut self, window: WindowId, title: &str, message: &str);
}
