//! Conversation UI components for the chat screen

pub mod composer;
pub mod history;
pub mod manager;
pub mod pending;

pub use composer::ConversationComposer;
pub use history::ConversationHistory;
pub use manager::{ConversationAction, ConversationManager};
pub use pending::Spinner;
