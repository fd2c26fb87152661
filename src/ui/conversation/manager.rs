use super::composer::{self, ComposerResult, ConversationComposer};
use super::history::ConversationHistory;
use super::pending::Spinner;
use crate::chat::{ChatBoard, ChatController};
use crate::client::ChatTransport;
use crate::config::UiConfig;
use crate::events::TuiEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const WHEEL_LINES: usize = 3;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Owns the chat screen: routes input to the composer and controller,
/// and lays out the log, composer and status line.
pub struct ConversationManager<T> {
    controller: ChatController<T, ChatBoard>,
    board: ChatBoard,
    spinner: Spinner,
    ui: UiConfig,
    endpoint: String,
    in_flight: Vec<JoinHandle<()>>,
    history_area: Rect,
    composer_area: Rect,
}

impl<T> ConversationManager<T>
where
    T: ChatTransport + 'static,
{
    pub fn new(controller: ChatController<T, ChatBoard>, ui: UiConfig, endpoint: String) -> Self {
        let board = controller.view().as_ref().clone();
        Self {
            controller,
            board,
            spinner: Spinner::default(),
            ui,
            endpoint,
            in_flight: Vec::new(),
            history_area: Rect::default(),
            composer_area: Rect::default(),
        }
    }

    pub fn board(&self) -> &ChatBoard {
        &self.board
    }

    /// Requests started from this screen that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn handle_event(&mut self, event: TuiEvent) -> ConversationAction {
        match event {
            TuiEvent::Key(key) => return self.handle_key(key),
            TuiEvent::Mouse(mouse) => self.handle_mouse(mouse),
            TuiEvent::Paste(text) => self.board.with_input(|input| composer::handle_paste(input, &text)),
            TuiEvent::Resize(w, h) => debug!(width = w, height = h, "terminal resized"),
            TuiEvent::Tick => {
                self.spinner.tick();
                self.in_flight.retain(|handle| !handle.is_finished());
            }
        }
        ConversationAction::None
    }

    fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return ConversationAction::Exit,
            KeyCode::Char('c') if ctrl => return ConversationAction::Exit,
            KeyCode::Char('l') if ctrl => {
                info!("chat log cleared");
                self.board.clear();
            }
            KeyCode::PageUp => {
                let page = self.page_size();
                self.board.with_log(|log| log.scroll_up(page));
            }
            KeyCode::PageDown => {
                let page = self.page_size();
                self.board.with_log(|log| log.scroll_down(page));
            }
            _ => {
                if self.board.with_input(|input| composer::handle_key(input, key))
                    == ComposerResult::Submit
                {
                    self.submit();
                }
            }
        }
        ConversationAction::None
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.board.with_log(|log| log.scroll_up(WHEEL_LINES)),
            MouseEventKind::ScrollDown => self.board.with_log(|log| log.scroll_down(WHEEL_LINES)),
            MouseEventKind::Down(MouseButton::Left) => {
                let button = composer::send_button_area(self.composer_area);
                if contains(button, mouse.column, mouse.row) {
                    self.submit();
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        if let Some(handle) = self.controller.submit() {
            self.in_flight.push(handle);
        }
    }

    fn page_size(&self) -> usize {
        (self.history_area.height.saturating_sub(2) as usize).max(1)
    }

    /// Render the whole chat screen
    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(3),    // Chat log
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Status
            ])
            .split(frame.size());
        self.history_area = chunks[1];
        self.composer_area = chunks[2];

        let title = Line::from(Span::styled(
            self.ui.title.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(title), chunks[0]);

        let mut snapshot = self.board.snapshot();
        let max_scroll = ConversationHistory::new(&snapshot.log, self.spinner).max_scroll(chunks[1]);
        if snapshot.log.scroll_offset() > max_scroll {
            snapshot.log.clamp_scroll(max_scroll);
            self.board.with_log(|log| log.clamp_scroll(max_scroll));
        }

        frame.render_widget(ConversationHistory::new(&snapshot.log, self.spinner), chunks[1]);
        frame.render_widget(
            ConversationComposer::new(&snapshot.input, &self.ui.placeholder),
            chunks[2],
        );

        let pending = snapshot.log.pending_count();
        let mut status = vec![Span::styled(
            format!("{} ", self.endpoint),
            Style::default().fg(Color::DarkGray),
        )];
        if pending > 0 {
            status.push(Span::styled(
                format!("· {pending} waiting "),
                Style::default().fg(Color::Yellow),
            ));
        }
        if snapshot.log.scroll_offset() > 0 {
            status.push(Span::styled(
                "· scrolled (PgDn) ",
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[3]);
    }
}

#[cfg(test)]
impl<T> ConversationManager<T> {
    async fn wait_in_flight(&mut self) {
        for handle in self.in_flight.drain(..) {
            handle.await.unwrap();
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatView, Role, SERVER_ERROR_TEXT};
    use crate::client::AskReply;
    use crate::error::AskError;
    use async_trait::async_trait;
    use crossterm::event::KeyEventKind;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;
    use std::sync::Arc;

    struct EchoTransport;

    #[async_trait]
    impl ChatTransport for EchoTransport {
        async fn ask(&self, query: &str) -> Result<AskReply, AskError> {
            if query == "fail" {
                return Err(AskError::EmptyBody);
            }
            Ok(AskReply::new(json!({"response": format!("echo: {query}")})))
        }
    }

    fn manager() -> ConversationManager<EchoTransport> {
        let controller = ChatController::new(Arc::new(EchoTransport), Arc::new(ChatBoard::new()));
        ConversationManager::new(controller, UiConfig::default(), "http://test".into())
    }

    fn key(code: KeyCode) -> TuiEvent {
        TuiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> TuiEvent {
        TuiEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(manager: &mut ConversationManager<EchoTransport>, text: &str) {
        for c in text.chars() {
            manager.handle_event(key(KeyCode::Char(c)));
        }
    }

    fn draw(manager: &mut ConversationManager<EchoTransport>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| manager.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn enter_submits_and_reply_arrives() {
        let mut manager = manager();
        type_text(&mut manager, "Hi");

        assert_eq!(manager.handle_event(key(KeyCode::Enter)), ConversationAction::None);
        assert_eq!(manager.board().input_value(), "");

        manager.wait_in_flight().await;
        let log = manager.board().log();
        assert_eq!(log.last_message_from(Role::User).unwrap().text(), "Hi");
        assert_eq!(log.last_message_from(Role::Bot).unwrap().text(), "echo: Hi");
    }

    #[tokio::test]
    async fn enter_on_blank_input_sends_nothing() {
        let mut manager = manager();
        type_text(&mut manager, "   ");
        manager.handle_event(key(KeyCode::Enter));

        assert_eq!(manager.in_flight(), 0);
        assert!(manager.board().log().is_empty());
        assert_eq!(manager.board().input_value(), "   ");
    }

    #[tokio::test]
    async fn clicking_send_submits() {
        let mut manager = manager();
        draw(&mut manager);
        type_text(&mut manager, "fail");

        let button = composer::send_button_area(manager.composer_area);
        manager.handle_event(TuiEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: button.x + 1,
            row: button.y,
            modifiers: KeyModifiers::NONE,
        }));

        manager.wait_in_flight().await;
        let log = manager.board().log();
        assert_eq!(log.last_message_from(Role::Bot).unwrap().text(), SERVER_ERROR_TEXT);
    }

    #[tokio::test]
    async fn ctrl_l_clears_and_escape_exits() {
        let mut manager = manager();
        type_text(&mut manager, "Hi");
        manager.handle_event(key(KeyCode::Enter));
        manager.wait_in_flight().await;

        manager.handle_event(ctrl('l'));
        assert!(manager.board().log().is_empty());

        assert_eq!(manager.handle_event(ctrl('c')), ConversationAction::Exit);
        assert_eq!(manager.handle_event(key(KeyCode::Esc)), ConversationAction::Exit);
    }

    #[tokio::test]
    async fn draw_shows_pending_indicator_and_send_button() {
        let mut manager = manager();
        manager.board().set_input("Hi");
        let controller = manager.controller.clone();
        controller.begin().unwrap();

        let screen = draw(&mut manager);
        assert!(screen.contains("Analyzing your query..."));
        assert!(screen.contains("[Send]"));
        assert!(screen.contains("1 waiting"));
    }

    #[test]
    fn key_release_is_ignored_by_composer() {
        let mut manager = manager();
        let mut release = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        manager.handle_event(TuiEvent::Key(release));
        assert_eq!(manager.board().input_value(), "");
    }
}
