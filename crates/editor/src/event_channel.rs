// Chunk: docs/chunks/coordinator_queue - Event channel for the coordinator queue
//! Channels between the coordinator and everything that talks to it.
//!
//! [`EventSender`] is cloned into every producer: window views, watch threads
//! and the presenter. [`EventReceiver`] stays with the drain loop.
//!
//! Each window additionally gets a [`WindowEndpoint`]: its own inbox of
//! [`WindowMessage`]s plus a sender that tags every request with the window's
//! id, so a view can never speak for another window.
//!
//! We use `crossbeam-channel` so the watch drain threads can `select!` over
//! their stop and event channels with a flush timeout.

use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, SendError, Sender, TryRecvError};
use shadow_edit_protocol::{ConfirmResponse, DialogTicket, WindowId, WindowMessage, WindowRequest};

use crate::editor_event::EditorEvent;
use crate::file_watch_registry::WatchNotice;

#[derive(Clone, Debug)]
pub struct EventSender {
    sender: Sender<EditorEvent>,
}

pub struct EventReceiver {
    receiver: Receiver<EditorEvent>,
}

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    let (sender, receiver) = unbounded();
    (EventSender { sender }, EventReceiver { receiver })
}

impl EventSender {
    pub fn send(&self, event: EditorEvent) -> Result<(), SendError<EditorEvent>> {
        self.sender.send(event)
    }

    pub fn send_request(
        &self,
        window: WindowId,
        request: WindowRequest,
    ) -> Result<(), SendError<EditorEvent>> {
        self.send(EditorEvent::Window { window, request })
    }

    pub fn send_watch(&self, notice: WatchNotice) -> Result<(), SendError<EditorEvent>> {
        self.send(EditorEvent::Watch(notice))
    }

    pub fn send_dialog_answer(
        &self,
        ticket: DialogTicket,
        response: ConfirmResponse,
    ) -> Result<(), SendError<EditorEvent>> {
        self.send(EditorEvent::DialogAnswered { ticket, response })
    }

    pub fn send_picker_answer(
        &self,
        ticket: DialogTicket,
        path: Option<PathBuf>,
    ) -> Result<(), SendError<EditorEvent>> {
        self.send(EditorEvent::PickerAnswered { ticket, path })
    }

    pub fn send_open_file(&self, path: PathBuf) -> Result<(), SendError<EditorEvent>> {
        self.send(EditorEvent::OpenFile(path))
    }

    pub fn send_shutdown(&self) -> Result<(), SendError<EditorEvent>> {
        self.send(EditorEvent::Shutdown)
    }
}

impl EventReceiver {
    pub fn try_recv(&self) -> Result<EditorEvent, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Blocks until an event arrives. `None` once every sender is gone.
    pub fn recv(&self) -> Option<EditorEvent> {
        self.receiver.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<EditorEvent, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything currently queued, without blocking.
    pub fn drain(&self) -> Vec<EditorEvent> {
        self.receiver.try_iter().collect()
    }
}

/// One window's end of the coordinator link.
pub struct WindowEndpoint {
    pub id: WindowId,
    inbox: Receiver<WindowMessage>,
    outbox: EventSender,
}

impl WindowEndpoint {
    pub fn new(id: WindowId, inbox: Receiver<WindowMessage>, outbox: EventSender) -> Self {
        Self { id, inbox, outbox }
    }

    /// Sends a request tagged with this window's id.
    pub fn send(&self, request: WindowRequest) -> Result<(), SendError<EditorEvent>> {
        self.outbox.send_request(self.id, request)
    }

    pub fn try_recv(&self) -> Option<WindowMessage> {
        self.inbox.try_recv().ok()
    }

    /// Blocks until a message arrives. `None` once the coordinator has dropped
    /// the window.
    pub fn recv(&self) -> Option<WindowMessage> {
        self.inbox.recv().ok()
    }

    pub fn drain(&self) -> Vec<WindowMessage> {
        self.inbox.try_iter().collect()
    }

    /// The raw inbox, for views that `select!` over it alongside other input.
    pub fn inbox(&self) -> &Receiver<WindowMessage> {
        &self.inbox
    }
}
