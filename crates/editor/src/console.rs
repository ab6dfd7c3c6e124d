// Chunk: docs/chunks/console_frontend - Terminal host and presenter
//!
//! A line-oriented terminal front end.
//!
//! [`ConsoleHost`] gives every window a view thread running a
//! [`DocumentView`]; [`ConsolePresenter`] queues dialogs and pickers; and
//! [`ConsoleInput`] reads stdin and routes each line either to the dialog at
//! the head of the queue or, when none is pending, to the active window.
//!
//! Answering dialogs:
//! - empty line: the default option (pickers: cancel)
//! - `esc`: dismiss, which picks the cancel option
//! - a number: that option
//!
//! Window commands: `:w` save, `:saveas`, `:export`, `:e PATH` open, `:open`
//! picker, `:new`, `:revert`, `:q` close, `:windows`, `:focus N`, `:quit`.
//! Any other line is appended to the active buffer.

use std::collections::{BTreeMap, VecDeque};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use shadow_edit_protocol::{
    ConfirmRequest, DialogTicket, MenuState, OpenDialogOptions, SaveDialogOptions, WindowId,
    WindowMessage, WindowRequest,
};

use crate::config::EditorConfig;
use crate::confirm_dialog::{ConfirmDialog, ConfirmOutcome, DialogKey};
use crate::document_view::DocumentView;
use crate::event_channel::{EventSender, WindowEndpoint};
use crate::host::{HostEnvironment, ModalPresenter};
use crate::recent_documents::RecentDocuments;

/// A command typed at the console for the active window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Append(String),
    Save,
    SaveAs,
    ExportHtml,
    Open(PathBuf),
    OpenPicker,
    NewWindow,
    Revert,
    Close,
    Focus,
}

enum PendingInput {
    Confirm {
        ticket: DialogTicket,
        dialog: ConfirmDialog,
    },
    Pick {
        ticket: DialogTicket,
        title: String,
    },
}

#[derive(Default)]
struct ConsoleState {
    prompts: VecDeque<(WindowId, PendingInput)>,
    windows: BTreeMap<WindowId, Sender<ViewCommand>>,
    active: Option<WindowId>,
}

#[derive(Clone, Default)]
pub struct ConsoleShared {
    state: Arc<Mutex<ConsoleState>>,
}

impl ConsoleShared {
    fn lock(&self) -> MutexGuard<'_, ConsoleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds the three console pieces around one shared state.
pub fn console(
    config: &EditorConfig,
    recent: RecentDocuments,
    sender: EventSender,
) -> (ConsoleHost, ConsolePresenter, ConsoleInput) {
    let shared = ConsoleShared::default();
    (
        ConsoleHost {
            shared: shared.clone(),
            config: config.clone(),
            recent,
        },
        ConsolePresenter {
            shared: shared.clone(),
        },
        ConsoleInput { shared, sender },
    )
}

// =============================================================================
// Host
// =============================================================================

pub struct ConsoleHost {
    shared: ConsoleShared,
    config: EditorConfig,
    recent: RecentDocuments,
}

impl HostEnvironment for ConsoleHost {
    fn create_surface(&mut self, endpoint: WindowEndpoint) {
        let (commands_tx, commands_rx) = unbounded();
        let id = endpoint.id;
        self.shared.lock().windows.insert(id, commands_tx);

        let view = DocumentView::new(id, &self.config);
        let spawned = thread::Builder::new()
            .name(format!("view-{id}"))
            .spawn(move || run_view(view, endpoint, commands_rx));
        if let Err(e) = spawned {
            tracing::error!(window = %id, error = %e, "failed to start view thread");
        }
    }

    fn show_surface(&mut self, window: WindowId) {
        println!("[{window}] opened");
    }

    fn destroy_surface(&mut self, window: WindowId) {
        let mut state = self.shared.lock();
        state.windows.remove(&window);
        if state.active == Some(window) {
            state.active = state.windows.keys().next_back().copied();
        }

        let head_was_closed = state.prompts.front().is_some_and(|(w, _)| *w == window);
        state.prompts.retain(|(w, _)| *w != window);
        if head_was_closed {
            if let Some((next_window, next)) = state.prompts.front() {
                print_prompt(*next_window, next);
            }
        }
    }

    fn set_represented_filename(&mut self, window: WindowId, path: &Path) {
        tracing::debug!(%window, path = %path.display(), "represented file");
    }

    fn add_recent_document(&mut self, path: &Path) {
        self.recent.add(path);
        if let Err(e) = self.recent.save() {
            tracing::warn!(error = %e, "failed to save recent documents");
        }
    }

    fn refresh_menu(&mut self, state: &MenuState) {
        if let Some(focused) = state.focused {
            self.shared.lock().active = Some(focused);
        }
    }
}

fn run_view(mut view: DocumentView, endpoint: WindowEndpoint, commands: Receiver<ViewCommand>) {
    let id = view.window();
    // A console surface is ready as soon as its thread runs.
    let _ = endpoint.send(WindowRequest::ContentReady);
    let _ = endpoint.send(WindowRequest::Focused);
    let mut last_title = String::new();

    loop {
        let reply = select! {
            recv(endpoint.inbox()) -> msg => match msg {
                Ok(message) => {
                    report_message(id, &message);
                    view.handle_message(message)
                }
                Err(_) => break,
            },
            recv(commands) -> cmd => match cmd {
                Ok(command) => apply_command(&mut view, command),
                Err(_) => break,
            },
        };

        if let Some(request) = reply {
            if endpoint.send(request).is_err() {
                break;
            }
        }
        if view.is_closed() {
            break;
        }
        if view.title() != last_title {
            last_title = view.title().to_string();
            println!("[{id}] {last_title}");
        }
    }
}

fn apply_command(view: &mut DocumentView, command: ViewCommand) -> Option<WindowRequest> {
    match command {
        ViewCommand::Append(line) => {
            let mut buffer = view.buffer().to_string();
            if !buffer.is_empty() && !buffer.ends_with('\n') {
                buffer.push('\n');
            }
            buffer.push_str(&line);
            view.on_buffer_changed(buffer)
        }
        ViewCommand::Save => Some(view.request_save()),
        ViewCommand::SaveAs => Some(view.request_save_as()),
        ViewCommand::ExportHtml => Some(view.request_export_html(render_html(view.buffer()))),
        ViewCommand::Open(path) => match view.drop_file(path) {
            Ok(request) => Some(request),
            Err(e) => {
                println!("[{}] {e}", view.window());
                None
            }
        },
        ViewCommand::OpenPicker => Some(WindowRequest::RequestOpenPicker),
        ViewCommand::NewWindow => Some(WindowRequest::RequestNewWindow),
        ViewCommand::Revert => view.on_revert(),
        ViewCommand::Close => Some(WindowRequest::RequestClose),
        ViewCommand::Focus => Some(WindowRequest::Focused),
    }
}

fn report_message(id: WindowId, message: &WindowMessage) {
    match message {
        WindowMessage::OperationFailed { message, .. } => println!("[{id}] error: {message}"),
        WindowMessage::WatchUnavailable { message, .. } => {
            println!("[{id}] external changes will not be detected: {message}")
        }
        _ => {}
    }
}

/// The console has no Markdown renderer; exports wrap the source in `<pre>`.
fn render_html(source: &str) -> String {
    let mut escaped = String::with_capacity(source.len());
    for c in source.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    format!("<!DOCTYPE html>\n<html><body><pre>{escaped}</pre></body></html>\n")
}

// =============================================================================
// Presenter
// =============================================================================

pub struct ConsolePresenter {
    shared: ConsoleShared,
}

impl ConsolePresenter {
    fn enqueue(&mut self, window: WindowId, input: PendingInput) {
        let mut state = self.shared.lock();
        if state.prompts.is_empty() {
            print_prompt(window, &input);
        }
        state.prompts.push_back((window, input));
    }
}

impl ModalPresenter for ConsolePresenter {
    fn confirm(&mut self, window: WindowId, ticket: DialogTicket, request: ConfirmRequest) {
        let dialog = ConfirmDialog::new(request);
        self.enqueue(window, PendingInput::Confirm { ticket, dialog });
    }

    fn pick_open(&mut self, window: WindowId, ticket: DialogTicket, options: &OpenDialogOptions) {
        let title = format!("{} ({})", options.title, extensions(&options.filters));
        self.enqueue(window, PendingInput::Pick { ticket, title });
    }

    fn pick_save(&mut self, window: WindowId, ticket: DialogTicket, options: &SaveDialogOptions) {
        let dir = options
            .default_path
            .as_deref()
            .map(|p| format!(" in {}", p.display()))
            .unwrap_or_default();
        let title = format!("{}{dir} ({})", options.title, extensions(&options.filters));
        self.enqueue(window, PendingInput::Pick { ticket, title });
    }

    fn alert(&mut self, window: WindowId, title: &str, message: &str) {
        eprintln!("[{window}] {title}: {message}");
    }
}

fn extensions(filters: &[shadow_edit_protocol::FileFilter]) -> String {
    filters
        .iter()
        .flat_map(|f| f.extensions.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_prompt(window: WindowId, input: &PendingInput) {
    match input {
        PendingInput::Confirm { dialog, .. } => {
            print!("[{window}] {}", dialog.render_text());
            println!("choice (Enter = default, esc = cancel)>");
        }
        PendingInput::Pick { title, .. } => {
            println!("[{window}] {title}: path (empty = cancel)>");
        }
    }
}

// =============================================================================
// Input
// =============================================================================

pub struct ConsoleInput {
    shared: ConsoleShared,
    sender: EventSender,
}

/// What a line of input did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Answered,
    StillPending,
    Routed(WindowId),
    OpenedNew,
    Listed(Vec<WindowId>),
    NoWindow,
    Quit,
}

impl ConsoleInput {
    /// Reads stdin on a background thread until EOF or `:quit`. EOF dismisses
    /// whatever is pending, then shuts the coordinator down.
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new().name("console-input".into()).spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if self.handle_line(&line) == LineOutcome::Quit {
                    return;
                }
            }
            while self.handle_line("esc") == LineOutcome::Answered {}
            let _ = self.sender.send_shutdown();
        })
    }

    pub fn handle_line(&self, line: &str) -> LineOutcome {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut state = self.shared.lock();

        if let Some((_, front)) = state.prompts.front_mut() {
            let outcome = answer(front, line.trim(), &self.sender);
            if outcome == LineOutcome::Answered {
                state.prompts.pop_front();
                if let Some((window, next)) = state.prompts.front() {
                    print_prompt(*window, next);
                }
            }
            return outcome;
        }

        let (command, argument) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command {
            ":quit" => {
                let _ = self.sender.send_shutdown();
                return LineOutcome::Quit;
            }
            ":windows" => return LineOutcome::Listed(state.windows.keys().copied().collect()),
            ":focus" => {
                let target = argument.parse::<u64>().ok().map(WindowId);
                return match target.and_then(|id| state.windows.get(&id).map(|tx| (id, tx))) {
                    Some((id, tx)) => {
                        let _ = tx.send(ViewCommand::Focus);
                        LineOutcome::Routed(id)
                    }
                    None => LineOutcome::NoWindow,
                };
            }
            _ => {}
        }

        let Some(active) = state.active.filter(|id| state.windows.contains_key(id)) else {
            if command == ":e" && !argument.is_empty() {
                let _ = self.sender.send_open_file(PathBuf::from(argument));
                return LineOutcome::OpenedNew;
            }
            return LineOutcome::NoWindow;
        };

        let view_command = match command {
            ":w" => ViewCommand::Save,
            ":saveas" => ViewCommand::SaveAs,
            ":export" => ViewCommand::ExportHtml,
            ":e" if !argument.is_empty() => ViewCommand::Open(PathBuf::from(argument)),
            ":open" => ViewCommand::OpenPicker,
            ":new" => ViewCommand::NewWindow,
            ":revert" => ViewCommand::Revert,
            ":q" => ViewCommand::Close,
            _ => ViewCommand::Append(line.to_string()),
        };
        if let Some(tx) = state.windows.get(&active) {
            let _ = tx.send(view_command);
        }
        LineOutcome::Routed(active)
    }
}

fn answer(input: &mut PendingInput, line: &str, sender: &EventSender) -> LineOutcome {
    match input {
        PendingInput::Confirm { ticket, dialog } => {
            let outcome = match line {
                "" => dialog.handle_key(DialogKey::Enter),
                "esc" => dialog.handle_key(DialogKey::Escape),
                other => match other.parse::<usize>() {
                    Ok(index) => dialog.choose(index),
                    Err(_) => ConfirmOutcome::Pending,
                },
            };
            match outcome {
                ConfirmOutcome::Answered(response) => {
                    let _ = sender.send_dialog_answer(*ticket, response);
                    LineOutcome::Answered
                }
                ConfirmOutcome::Pending => LineOutcome::StillPending,
            }
        }
        PendingInput::Pick { ticket, .. } => {
            let path = match line {
                "" | "esc" => None,
                other => Some(PathBuf::from(other)),
            };
            let _ = sender.send_picker_answer(*ticket, path);
            LineOutcome::Answered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor_event::EditorEvent;
    use crate::event_channel::{create_event_channel, EventReceiver};
    use shadow_edit_protocol::ConfirmResponse;

    fn setup() -> (ConsolePresenter, ConsoleInput, EventReceiver) {
        let (sender, receiver) = create_event_channel();
        let config = EditorConfig::default();
        let (_host, presenter, input) = console(&config, RecentDocuments::in_memory(5), sender);
        (presenter, input, receiver)
    }

    fn confirm_request() -> ConfirmRequest {
        ConfirmRequest::two_choice("File Changed", "Reload?", "Reload", "Ignore")
    }

    #[test]
    fn test_empty_line_picks_default() {
        let (mut presenter, input, receiver) = setup();
        presenter.confirm(WindowId(1), DialogTicket(4), confirm_request());

        assert_eq!(input.handle_line(""), LineOutcome::Answered);
        match receiver.try_recv().unwrap() {
            EditorEvent::DialogAnswered { ticket, response } => {
                assert_eq!(ticket, DialogTicket(4));
                assert_eq!(response, ConfirmResponse(0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_esc_dismisses_to_cancel() {
        let (mut presenter, input, receiver) = setup();
        presenter.confirm(WindowId(1), DialogTicket(4), confirm_request());

        input.handle_line("esc");
        match receiver.try_recv().unwrap() {
            EditorEvent::DialogAnswered { response, .. } => assert_eq!(response, ConfirmResponse(1)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_garbage_keeps_dialog_open() {
        let (mut presenter, input, receiver) = setup();
        presenter.confirm(WindowId(1), DialogTicket(4), confirm_request());

        assert_eq!(input.handle_line("maybe"), LineOutcome::StillPending);
        assert_eq!(input.handle_line("9"), LineOutcome::StillPending);
        assert!(receiver.try_recv().is_err());
        assert_eq!(input.handle_line("1"), LineOutcome::Answered);
    }

    #[test]
    fn test_prompts_answered_in_order() {
        let (mut presenter, input, receiver) = setup();
        presenter.confirm(WindowId(1), DialogTicket(1), confirm_request());
        let options = OpenDialogOptions::documents();
        presenter.pick_open(WindowId(2), DialogTicket(2), &options);

        input.handle_line("");
        input.handle_line("/docs/notes.md");

        let events = receiver.drain();
        assert!(matches!(events[0], EditorEvent::DialogAnswered { ticket: DialogTicket(1), .. }));
        match &events[1] {
            EditorEvent::PickerAnswered { ticket, path } => {
                assert_eq!(*ticket, DialogTicket(2));
                assert_eq!(path.as_deref(), Some(Path::new("/docs/notes.md")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_closing_window_drops_its_prompts() {
        let (sender, receiver) = create_event_channel();
        let config = EditorConfig::default();
        let (mut host, mut presenter, input) =
            console(&config, RecentDocuments::in_memory(5), sender);
        presenter.pick_save(WindowId(1), DialogTicket(1), &SaveDialogOptions::markdown(None));
        presenter.confirm(WindowId(2), DialogTicket(2), confirm_request());
        presenter.confirm(WindowId(1), DialogTicket(3), confirm_request());

        host.destroy_surface(WindowId(1));
        assert_eq!(input.shared.lock().prompts.len(), 1);

        // The next line answers the surviving window's dialog.
        assert_eq!(input.handle_line(""), LineOutcome::Answered);
        match receiver.try_recv().unwrap() {
            EditorEvent::DialogAnswered { ticket, .. } => assert_eq!(ticket, DialogTicket(2)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_empty_picker_answer_cancels() {
        let (mut presenter, input, receiver) = setup();
        presenter.pick_save(WindowId(1), DialogTicket(3), &SaveDialogOptions::markdown(None));

        input.handle_line("");
        match receiver.try_recv().unwrap() {
            EditorEvent::PickerAnswered { path, .. } => assert_eq!(path, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_commands_without_window() {
        let (_presenter, input, receiver) = setup();
        assert_eq!(input.handle_line("hello"), LineOutcome::NoWindow);
        assert_eq!(input.handle_line(":e /docs/a.md"), LineOutcome::OpenedNew);
        assert!(matches!(receiver.try_recv().unwrap(), EditorEvent::OpenFile(_)));
        assert_eq!(input.handle_line(":quit"), LineOutcome::Quit);
        assert!(receiver.try_recv().unwrap().is_shutdown());
    }

    #[test]
    fn test_lines_route_to_active_window() {
        let (_presenter, input, _receiver) = setup();
        let (tx, rx) = unbounded();
        {
            let mut state = input.shared.lock();
            state.windows.insert(WindowId(7), tx);
            state.active = Some(WindowId(7));
        }

        assert_eq!(input.handle_line("# Hi"), LineOutcome::Routed(WindowId(7)));
        assert_eq!(input.handle_line(":w"), LineOutcome::Routed(WindowId(7)));
        assert_eq!(rx.try_recv().unwrap(), ViewCommand::Append("# Hi".into()));
        assert_eq!(rx.try_recv().unwrap(), ViewCommand::Save);
    }

    #[test]
    fn test_append_joins_lines() {
        let mut view = DocumentView::new(WindowId(1), &EditorConfig::default());
        apply_command(&mut view, ViewCommand::Append("# Hi".into()));
        apply_command(&mut view, ViewCommand::Append("there".into()));
        assert_eq!(view.buffer(), "# Hi\nthere");
    }

    #[test]
    fn test_render_html_escapes() {
        let html = render_html("a < b & c");
        assert!(html.contains("<pre>a &lt; b &amp; c</pre>"));
    }
}
