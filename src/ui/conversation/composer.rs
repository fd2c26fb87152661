use crate::chat::InputState;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Label of the clickable send button
pub const SEND_LABEL: &str = "[Send]";

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// Enter was pressed; the caller submits whatever is in the input
    Submit,
    /// Input was edited or the key was ignored
    None,
}

/// Apply a key press to the input state
pub fn handle_key(state: &mut InputState, key: KeyEvent) -> ComposerResult {
    if key.kind != KeyEventKind::Press {
        return ComposerResult::None;
    }

    match key.code {
        KeyCode::Enter => return ComposerResult::Submit,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.insert_char(c);
        }
        KeyCode::Backspace => {
            state.backspace();
        }
        KeyCode::Delete => {
            state.delete();
        }
        KeyCode::Left => state.move_left(),
        KeyCode::Right => state.move_right(),
        KeyCode::Home => state.move_home(),
        KeyCode::End => state.move_end(),
        _ => {}
    }

    ComposerResult::None
}

/// Insert pasted text; line breaks become spaces since the input is one line
pub fn handle_paste(state: &mut InputState, text: &str) {
    let flattened: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    state.insert_str(&flattened);
}

/// Screen area of the send button inside a composer drawn at `area`
pub fn send_button_area(area: Rect) -> Rect {
    let width = SEND_LABEL.len() as u16;
    let inner = Block::default().borders(Borders::ALL).inner(area);
    Rect {
        x: (inner.x + inner.width).saturating_sub(width),
        y: inner.y,
        width: width.min(inner.width),
        height: inner.height.min(1),
    }
}

/// Last `room` chars of `text`, so the cursor after it stays on screen
fn visible_tail(text: &str, room: usize) -> &str {
    let skip = text.chars().count().saturating_sub(room);
    text.char_indices().nth(skip).map_or("", |(i, _)| &text[i..])
}

/// Single-line input with placeholder and send button
pub struct ConversationComposer<'a> {
    state: &'a InputState,
    placeholder: &'a str,
}

impl<'a> ConversationComposer<'a> {
    pub fn new(state: &'a InputState, placeholder: &'a str) -> Self {
        Self { state, placeholder }
    }
}

impl Widget for ConversationComposer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Message")
            .style(Style::default().fg(Color::Green));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let button = send_button_area(area);
        let text_width = inner_area.width.saturating_sub(button.width + 1);

        let line = if self.state.content.is_empty() {
            Line::from(vec![
                Span::styled("▌", Style::default().fg(Color::Green)),
                Span::styled(self.placeholder, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            let (before, after) = self.state.split_at_cursor();
            // one cell is reserved for the cursor glyph
            let before = visible_tail(before, text_width.saturating_sub(1) as usize);
            Line::from(vec![
                Span::raw(before),
                Span::styled("▌", Style::default().fg(Color::Green)),
                Span::raw(after),
            ])
        };
        buf.set_line(inner_area.x, inner_area.y, &line, text_width);

        let send = Line::from(Span::styled(
            SEND_LABEL,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        buf.set_line(button.x, button.y, &send, button.width);
    }
}
