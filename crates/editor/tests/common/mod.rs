// Chunk: docs/chunks/coordinator - Deterministic coordinator test harness
//!
//! Shared harness for coordinator integration tests.
//!
//! Everything runs on the test thread: the harness pumps the coordinator's
//! queue through `EventDrainLoop::process_pending_events`, then delivers each
//! window's messages to an in-process `DocumentView`, and repeats until
//! nothing moves. Watches come from `ManualWatchFactory`, so filesystem
//! notices only happen when a test fires them.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use shadow_edit::config::EditorConfig;
use shadow_edit::coordinator::Coordinator;
use shadow_edit::document_view::DocumentView;
use shadow_edit::drain_loop::{EventDrainLoop, LoopStatus};
use shadow_edit::event_channel::{create_event_channel, EventSender, WindowEndpoint};
use shadow_edit::file_watch_registry::WatchEventKind;
use shadow_edit::host::{HostEnvironment, ModalPresenter};
use shadow_edit::manual_watch::{ManualWatchFactory, ManualWatchHandle};
use shadow_edit::protocol::{
    ConfirmRequest, ConfirmResponse, DialogTicket, MenuState, OpenDialogOptions,
    SaveDialogOptions, WindowId, WindowMessage, WindowRequest,
};

// =============================================================================
// Recording host and presenter
// =============================================================================

#[derive(Default)]
pub struct HostLog {
    pub new_endpoints: Vec<WindowEndpoint>,
    pub shown: Vec<WindowId>,
    pub destroyed: Vec<WindowId>,
    pub represented: Vec<(WindowId, PathBuf)>,
    pub recent: Vec<PathBuf>,
    pub menus: Vec<MenuState>,
}

pub struct RecordingHost(pub Arc<Mutex<HostLog>>);

impl HostEnvironment for RecordingHost {
    fn create_surface(&mut self, endpoint: WindowEndpoint) {
        self.0.lock().unwrap().new_endpoints.push(endpoint);
    }

    fn show_surface(&mut self, window: WindowId) {
        self.0.lock().unwrap().shown.push(window);
    }

    fn destroy_surface(&mut self, window: WindowId) {
        self.0.lock().unwrap().destroyed.push(window);
    }

    fn set_represented_filename(&mut self, window: WindowId, path: &Path) {
        self.0
            .lock()
            .unwrap()
            .represented
            .push((window, path.to_path_buf()));
    }

    fn add_recent_document(&mut self, path: &Path) {
        self.0.lock().unwrap().recent.push(path.to_path_buf());
    }

    fn refresh_menu(&mut self, state: &MenuState) {
        self.0.lock().unwrap().menus.push(*state);
    }
}

#[derive(Debug, Clone)]
pub struct Confirm {
    pub window: WindowId,
    pub ticket: DialogTicket,
    pub request: ConfirmRequest,
}

#[derive(Debug, Clone)]
pub enum Picker {
    Open(OpenDialogOptions),
    Save(SaveDialogOptions),
}

#[derive(Default)]
pub struct PresenterLog {
    pub confirms: Vec<Confirm>,
    pub pickers: Vec<(WindowId, DialogTicket, Picker)>,
    pub alerts: Vec<(WindowId, String, String)>,
}

pub struct RecordingPresenter(pub Arc<Mutex<PresenterLog>>);

impl ModalPresenter for RecordingPresenter {
    fn confirm(&mut self, window: WindowId, ticket: DialogTicket, request: ConfirmRequest) {
        self.0.lock().unwrap().confirms.push(Confirm {
            window,
            ticket,
            request,
        });
    }

    fn pick_open(&mut self, window: WindowId, ticket: DialogTicket, options: &OpenDialogOptions) {
        self.0
            .lock()
            .unwrap()
            .pickers
            .push((window, ticket, Picker::Open(options.clone())));
    }

    fn pick_save(&mut self, window: WindowId, ticket: DialogTicket, options: &SaveDialogOptions) {
        self.0
            .lock()
            .unwrap()
            .pickers
            .push((window, ticket, Picker::Save(options.clone())));
    }

    fn alert(&mut self, window: WindowId, title: &str, message: &str) {
        self.0
            .lock()
            .unwrap()
            .alerts
            .push((window, title.to_string(), message.to_string()));
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct TestView {
    pub endpoint: WindowEndpoint,
    pub view: DocumentView,
    /// Every message this window has received, in order.
    pub received: Vec<WindowMessage>,
}

pub struct Harness {
    pub dir: TempDir,
    pub driver: EventDrainLoop,
    pub sender: EventSender,
    pub watches: ManualWatchHandle,
    pub host: Arc<Mutex<HostLog>>,
    pub presenter: Arc<Mutex<PresenterLog>>,
    pub views: BTreeMap<WindowId, TestView>,
    pub config: EditorConfig,
    /// Result of the most recent pump.
    pub status: LoopStatus,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let (sender, receiver) = create_event_channel();
        let (factory, watches) = ManualWatchFactory::new();
        let host = Arc::new(Mutex::new(HostLog::default()));
        let presenter = Arc::new(Mutex::new(PresenterLog::default()));

        let coordinator = Coordinator::new(
            config.clone(),
            Box::new(factory),
            Box::new(RecordingHost(host.clone())),
            Box::new(RecordingPresenter(presenter.clone())),
            sender.clone(),
        );

        Self {
            dir,
            driver: EventDrainLoop::new(coordinator, receiver),
            sender,
            watches,
            host,
            presenter,
            views: BTreeMap::new(),
            config,
            status: LoopStatus::Continue,
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        self.driver.coordinator()
    }

    /// Pumps coordinator and views until both are idle.
    pub fn settle(&mut self) {
        loop {
            let mut progressed = false;

            let adopted: Vec<WindowEndpoint> =
                std::mem::take(&mut self.host.lock().unwrap().new_endpoints);
            for endpoint in adopted {
                let id = endpoint.id;
                endpoint.send(WindowRequest::ContentReady).unwrap();
                let view = DocumentView::new(id, &self.config);
                self.views.insert(
                    id,
                    TestView {
                        endpoint,
                        view,
                        received: Vec::new(),
                    },
                );
                progressed = true;
            }

            if self.driver.process_pending_events() == LoopStatus::Exit {
                self.status = LoopStatus::Exit;
            }

            for test_view in self.views.values_mut() {
                for message in test_view.endpoint.drain() {
                    progressed = true;
                    test_view.received.push(message.clone());
                    if let Some(reply) = test_view.view.handle_message(message) {
                        let _ = test_view.endpoint.send(reply);
                    }
                }
            }

            // Views only send in response to adoption or a delivered message,
            // so an idle round means the queue is empty too. Windows created
            // during this round still need adopting.
            if !progressed && self.host.lock().unwrap().new_endpoints.is_empty() {
                break;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Files
    // -------------------------------------------------------------------------

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Writes `content` behind the editor's back and fires a Modified notice.
    pub fn external_write(&mut self, path: &Path, content: &str) -> usize {
        fs::write(path, content).unwrap();
        let fired = self.watches.fire(path, WatchEventKind::Modified);
        self.settle();
        fired
    }

    pub fn external_remove(&mut self, path: &Path) -> usize {
        fs::remove_file(path).unwrap();
        let fired = self.watches.fire(path, WatchEventKind::Removed);
        self.settle();
        fired
    }

    // -------------------------------------------------------------------------
    // Windows
    // -------------------------------------------------------------------------

    pub fn new_window(&mut self) -> WindowId {
        let id = self.driver.coordinator_mut().create_window();
        self.settle();
        id
    }

    pub fn open_file(&mut self, path: &Path) -> WindowId {
        let id = self
            .driver
            .coordinator_mut()
            .open_in_new_window(path.to_path_buf());
        self.settle();
        id
    }

    pub fn view(&self, id: WindowId) -> &DocumentView {
        &self.views[&id].view
    }

    pub fn received(&self, id: WindowId) -> &[WindowMessage] {
        &self.views[&id].received
    }

    pub fn edit(&mut self, id: WindowId, content: &str) {
        let test_view = self.views.get_mut(&id).unwrap();
        if let Some(request) = test_view.view.on_buffer_changed(content) {
            test_view.endpoint.send(request).unwrap();
        }
        self.settle();
    }

    pub fn revert(&mut self, id: WindowId) {
        let test_view = self.views.get_mut(&id).unwrap();
        if let Some(request) = test_view.view.on_revert() {
            test_view.endpoint.send(request).unwrap();
        }
        self.settle();
    }

    pub fn request(&mut self, id: WindowId, request: WindowRequest) {
        // Requests from closed windows are still allowed to reach the queue.
        let _ = self.sender.send_request(id, request);
        self.settle();
    }

    pub fn save(&mut self, id: WindowId) {
        let request = self.view(id).request_save();
        self.request(id, request);
    }

    // -------------------------------------------------------------------------
    // Dialogs
    // -------------------------------------------------------------------------

    pub fn confirm_count(&self) -> usize {
        self.presenter.lock().unwrap().confirms.len()
    }

    pub fn last_confirm(&self) -> Confirm {
        self.presenter
            .lock()
            .unwrap()
            .confirms
            .last()
            .cloned()
            .expect("no confirmation was shown")
    }

    pub fn answer(&mut self, ticket: DialogTicket, index: usize) {
        self.sender
            .send_dialog_answer(ticket, ConfirmResponse(index))
            .unwrap();
        self.settle();
    }

    pub fn answer_last(&mut self, index: usize) {
        let ticket = self.last_confirm().ticket;
        self.answer(ticket, index);
    }

    pub fn picker_count(&self) -> usize {
        self.presenter.lock().unwrap().pickers.len()
    }

    pub fn last_picker(&self) -> (WindowId, DialogTicket, Picker) {
        self.presenter
            .lock()
            .unwrap()
            .pickers
            .last()
            .cloned()
            .expect("no picker was shown")
    }

    pub fn answer_picker(&mut self, path: Option<PathBuf>) {
        let (_, ticket, _) = self.last_picker();
        self.sender.send_picker_answer(ticket, path).unwrap();
        self.settle();
    }

    pub fn alerts(&self) -> Vec<(WindowId, String, String)> {
        self.presenter.lock().unwrap().alerts.clone()
    }
}
