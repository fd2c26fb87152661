use super::log::PendingId;
use super::message::{Message, Role};

/// The surface the chat controller drives: an input field and a scrolling log.
///
/// Methods take `&self`; implementations hold their state behind a lock so a
/// view can be shared between the UI loop and in-flight requests.
pub trait ChatView: Send + Sync {
    /// Current raw value of the input field
    fn input_value(&self) -> String;

    fn clear_input(&self);

    /// Append a message to the log and scroll to the bottom
    fn append_message(&self, message: Message);

    /// Append a pending request indicator
    fn show_pending(&self) -> PendingId;

    fn remove_pending(&self, id: PendingId);

    fn scroll_to_bottom(&self);

    /// Remove the pending indicator and append its reply as one step, so no
    /// reader ever sees both or neither.
    fn resolve_pending(&self, id: PendingId, reply: Message) {
        self.remove_pending(id);
        self.append_message(reply);
        self.scroll_to_bottom();
    }

    /// Shorthand for appending a message built from a role and text
    fn append(&self, role: Role, text: &str) {
        self.append_message(Message::new(role, text));
    }
}
