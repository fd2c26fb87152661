use crate::chat::PENDING_LABEL;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

const FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Spinner shown on pending request indicators, advanced on every tick
#[derive(Debug, Clone, Copy, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
    }

    pub fn symbol(&self) -> &'static str {
        FRAMES[self.frame]
    }

    /// Line rendered in place of a pending indicator
    pub fn indicator_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled("🤖 ", Style::default().fg(Color::Green)),
            Span::styled(self.symbol(), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled(PENDING_LABEL, Style::default().fg(Color::Green)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_wraps_around() {
        let mut spinner = Spinner::default();
        let first = spinner.symbol();
        for _ in 0..FRAMES.len() {
            spinner.tick();
        }
        assert_eq!(spinner.symbol(), first);
        spinner.tick();
        assert_ne!(spinner.symbol(), first);
    }

    #[test]
    fn indicator_mentions_label() {
        let line = Spinner::default().indicator_line();
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.ends_with(PENDING_LABEL));
    }
}
