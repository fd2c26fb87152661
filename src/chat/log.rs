//! Ordered chat log model

use super::message::{Message, Role};
use uuid::Uuid;

/// Label shown next to the spinner while a reply is outstanding
pub const PENDING_LABEL: &str = "Analyzing your query...";

/// Handle for a pending request indicator in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingId(Uuid);

impl PendingId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// An entry in the chat log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Message(Message),
    Pending(PendingId),
}

impl LogEntry {
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            LogEntry::Message(message) => Some(message),
            LogEntry::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LogEntry::Pending(_))
    }
}

/// Append-only sequence of messages plus transient pending indicators
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    entries: Vec<LogEntry>,
    /// Lines scrolled up from the bottom; 0 means pinned to the latest entry
    scroll_offset: usize,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and scroll to the bottom
    pub fn append_message(&mut self, message: Message) {
        self.entries.push(LogEntry::Message(message));
        self.scroll_to_bottom();
    }

    /// Append a pending request indicator
    pub fn push_pending(&mut self) -> PendingId {
        let id = PendingId::new();
        self.entries.push(LogEntry::Pending(id));
        id
    }

    /// Remove a pending indicator. Returns false if it was already gone
    /// (for example after the log was cleared).
    pub fn remove_pending(&mut self, id: PendingId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != &LogEntry::Pending(id));
        self.entries.len() != before
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Clamp the offset so it never scrolls past the first line
    pub fn clamp_scroll(&mut self, max_offset: usize) {
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll_offset = 0;
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(LogEntry::as_message)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_pending()).count()
    }

    pub fn last_message_from(&self, role: Role) -> Option<&Message> {
        self.messages().filter(|m| m.role() == role).last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
