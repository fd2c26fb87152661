//! Chat log display component

use super::pending::Spinner;
use crate::chat::{ChatLog, LogEntry, Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders a chat log, bottom-aligned, honouring its scroll offset
pub struct ConversationHistory<'a> {
    log: &'a ChatLog,
    spinner: Spinner,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(log: &'a ChatLog, spinner: Spinner) -> Self {
        Self { log, spinner }
    }

    /// Every line of the log for a given content width
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut all_lines = Vec::new();
        for entry in self.log.entries() {
            match entry {
                LogEntry::Message(message) => {
                    all_lines.extend(render_message(message, width));
                }
                LogEntry::Pending(_) => all_lines.push(self.spinner.indicator_line()),
            }
            all_lines.push(Line::from(""));
        }
        all_lines
    }

    /// Largest useful scroll offset for a panel of the given size
    pub fn max_scroll(&self, area: Rect) -> usize {
        let inner = Self::block().inner(area);
        self.lines(inner.width)
            .len()
            .saturating_sub(inner.height as usize)
    }

    fn block() -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .title("Chat")
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Self::block();
        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.log.is_empty() {
            let welcome_lines = [
                Line::from(Span::styled(
                    "Ask anything about our products.",
                    Style::default().fg(Color::Green),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter sends, PgUp/PgDn scroll, Ctrl+L clears, Esc quits.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let all_lines = self.lines(inner_area.width);
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let offset = self.log.scroll_offset().min(total.saturating_sub(height));
        let end = total - offset;
        let start = end.saturating_sub(height);

        for (i, line) in all_lines[start..end].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Header plus wrapped body of a single message
fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let timestamp = message.created_at().with_timezone(&chrono::Local).format("%H:%M");
    lines.push(Line::from(vec![
        Span::raw(format!("{} ", message.role().icon())),
        Span::styled(
            format!("{} {}", message.role(), timestamp),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    let style = content_style(message.role());
    for content_line in wrap_text(message.text(), width.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(content_line, style),
        ]));
    }

    lines
}

fn content_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Blue),
        Role::Bot => Style::default().fg(Color::Green),
    }
}

/// Word-wrap text to `width` columns, keeping explicit line breaks.
/// Words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }
            current_line.extend(word.iter());
            current_len += word.len();
        }

        lines.push(current_line);
    }

    lines
}
