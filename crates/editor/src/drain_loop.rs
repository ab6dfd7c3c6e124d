// Chunk: docs/chunks/coordinator_queue - Event drain loop (single ownership of the coordinator)
//! Event drain loop for the coordinator queue.
//!
//! `EventDrainLoop` owns the [`Coordinator`] directly. Every producer sends
//! through the shared [`EventSender`](crate::event_channel::EventSender) and
//! the loop applies events one at a time, so the coordinator's registries are
//! never touched from two places at once.
//!
//! ```text
//! window views ───────┐
//! watch threads ──────┤──→ EventSender ──→ channel ──→ EventDrainLoop ──→ Coordinator
//! presenter ──────────┤
//! OS open requests ───┘
//! ```

use crate::coordinator::Coordinator;
use crate::editor_event::EditorEvent;
use crate::event_channel::EventReceiver;

/// Whether the loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Continue,
    Exit,
}

pub struct EventDrainLoop {
    coordinator: Coordinator,
    receiver: EventReceiver,
    /// Set once any window has existed, so an app that starts with zero
    /// windows does not exit immediately.
    had_windows: bool,
}

impl EventDrainLoop {
    pub fn new(coordinator: Coordinator, receiver: EventReceiver) -> Self {
        let had_windows = coordinator.window_count() > 0;
        Self {
            coordinator,
            receiver,
            had_windows,
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    /// Handles everything currently queued without blocking.
    pub fn process_pending_events(&mut self) -> LoopStatus {
        while let Ok(event) = self.receiver.try_recv() {
            if self.dispatch(event) == LoopStatus::Exit {
                return LoopStatus::Exit;
            }
        }
        LoopStatus::Continue
    }

    /// Blocks on the queue until shutdown, the last window closing (if
    /// configured), or every sender going away.
    pub fn run(mut self) -> Coordinator {
        while let Some(event) = self.receiver.recv() {
            if self.dispatch(event) == LoopStatus::Exit {
                break;
            }
        }
        tracing::info!("coordinator stopped");
        self.coordinator
    }

    fn dispatch(&mut self, event: EditorEvent) -> LoopStatus {
        if event.is_shutdown() {
            tracing::info!("shutdown requested");
            return LoopStatus::Exit;
        }
        self.coordinator.handle_event(event);

        let open = self.coordinator.window_count();
        if open > 0 {
            self.had_windows = true;
            return LoopStatus::Continue;
        }
        if self.had_windows && self.coordinator.config().quit_when_last_window_closed {
            tracing::info!("last window closed");
            return LoopStatus::Exit;
        }
        LoopStatus::Continue
    }
}
