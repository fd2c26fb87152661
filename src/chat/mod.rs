//! Chat model, surface and controller

pub mod board;
pub mod controller;
pub mod log;
pub mod message;
pub mod view;

pub use board::{ChatBoard, InputState};
pub use controller::{ChatController, NO_RESPONSE_TEXT, PendingExchange, SERVER_ERROR_TEXT};
pub use log::{ChatLog, LogEntry, PENDING_LABEL, PendingId};
pub use message::{Message, Role};
pub use view::ChatView;
