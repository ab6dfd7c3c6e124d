// Chunk: docs/chunks/window_protocol - Coordinator <-> window message types
//!
//! Message types exchanged between the coordinator and editor windows.
//!
//! The coordinator owns every registry (windows, watchers, file bindings) and
//! all filesystem access. A window never mutates that state directly: it sends
//! a [`WindowRequest`] and later receives a [`WindowMessage`]. Neither side may
//! assume the other has processed a message synchronously.
//!
//! # Overview
//!
//! - [`WindowId`] - opaque identity of one editor surface
//! - [`WindowRequest`] - window → coordinator
//! - [`WindowMessage`] - coordinator → window
//! - [`ConfirmRequest`] / [`ConfirmResponse`] - the single shape every blocking
//!   confirmation takes, whoever presents it
//! - [`OpenDialogOptions`] / [`SaveDialogOptions`] - file picker parameters
//! - [`MenuState`] - window-scoped menu enablement pushed to the host
//!
//! # Example
//!
//! ```
//! use shadow_edit_protocol::{ConfirmRequest, ConfirmResponse};
//!
//! let request = ConfirmRequest::two_choice("Reload?", "The file changed.", "Reload", "Ignore");
//! assert_eq!(request.default_index(), Some(0));
//! assert_eq!(request.cancel_index(), Some(1));
//!
//! // Only the cancel slot declines; anything else proceeds.
//! assert!(!ConfirmResponse(1).is_proceed());
//! assert!(ConfirmResponse(0).is_proceed());
//! assert!(ConfirmResponse(7).is_proceed());
//! ```

mod dialog;
mod menu;
mod message;
mod window;

pub use dialog::{
    ConfirmOption, ConfirmRequest, ConfirmResponse, DialogKind, DialogTicket, FileFilter,
    OpenDialogOptions, SaveDialogOptions, CANCEL_RESPONSE,
};
pub use menu::MenuState;
pub use message::{DocumentOrigin, Operation, WindowMessage, WindowRequest};
pub use window::WindowId;
