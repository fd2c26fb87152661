//! Shared in-memory chat surface rendered by the terminal UI

use super::log::{ChatLog, PendingId};
use super::message::Message;
use super::view::ChatView;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Text and cursor of the input field. The cursor is a char index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub content: String,
    pub cursor_position: usize,
}

impl InputState {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let cursor_position = content.chars().count();
        Self {
            content,
            cursor_position,
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.content.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    /// Delete the char before the cursor
    pub fn backspace(&mut self) -> bool {
        if self.cursor_position == 0 {
            return false;
        }
        self.cursor_position -= 1;
        let at = self.byte_index(self.cursor_position);
        self.content.remove(at);
        true
    }

    /// Delete the char under the cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor_position >= self.char_len() {
            return false;
        }
        let at = self.byte_index(self.cursor_position);
        self.content.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_position < self.char_len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_position = self.char_len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_position = 0;
    }

    /// Content split at the cursor, for rendering
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.content.split_at(self.byte_index(self.cursor_position))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub input: InputState,
    pub log: ChatLog,
}

/// `ChatView` backed by shared state. Clones share the same board.
#[derive(Debug, Clone, Default)]
pub struct ChatBoard {
    state: Arc<Mutex<BoardState>>,
}

impl ChatBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> BoardState {
        self.lock().clone()
    }

    pub fn log(&self) -> ChatLog {
        self.lock().log.clone()
    }

    pub fn with_input<R>(&self, f: impl FnOnce(&mut InputState) -> R) -> R {
        f(&mut self.lock().input)
    }

    pub fn with_log<R>(&self, f: impl FnOnce(&mut ChatLog) -> R) -> R {
        f(&mut self.lock().log)
    }

    pub fn set_input(&self, text: &str) {
        self.lock().input = InputState::new(text);
    }

    /// Remove every entry from the log
    pub fn clear(&self) {
        self.lock().log.clear();
    }
}

impl ChatView for ChatBoard {
    fn input_value(&self) -> String {
        self.lock().input.content.clone()
    }

    fn clear_input(&self) {
        self.lock().input.clear();
    }

    fn append_message(&self, message: Message) {
        self.lock().log.append_message(message);
    }

    fn show_pending(&self) -> PendingId {
        self.lock().log.push_pending()
    }

    fn remove_pending(&self, id: PendingId) {
        self.lock().log.remove_pending(id);
    }

    fn scroll_to_bottom(&self) {
        self.lock().log.scroll_to_bottom();
    }

    fn resolve_pending(&self, id: PendingId, reply: Message) {
        let mut state = self.lock();
        state.log.remove_pending(id);
        state.log.append_message(reply);
        state.log.scroll_to_bottom();
    }
}
