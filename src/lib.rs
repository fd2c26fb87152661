//! Terminal chat client for an assistant `/ask` endpoint

pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod tui;
pub mod ui;

pub use chat::{ChatBoard, ChatController, ChatView, Message, Role};
pub use client::{AskClient, AskReply, ChatTransport};
pub use config::Config;
pub use error::AskError;
