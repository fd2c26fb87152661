//! Chat widget controller: input -> endpoint -> log

use super::log::PendingId;
use super::message::{Message, Role};
use super::view::ChatView;
use crate::client::{AskReply, ChatTransport};
use crate::error::AskError;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Bot text when the reply has no usable `response` field
pub const NO_RESPONSE_TEXT: &str = "Error: No response received";

/// Bot text when the request or decoding fails
pub const SERVER_ERROR_TEXT: &str = "⚠️ Server error. Try again later.";

/// Map the outcome of one exchange to the bot's reply text
pub fn reply_text(outcome: &Result<AskReply, AskError>) -> Cow<'_, str> {
    match outcome {
        Ok(reply) => reply.text().unwrap_or(Cow::Borrowed(NO_RESPONSE_TEXT)),
        Err(_) => Cow::Borrowed(SERVER_ERROR_TEXT),
    }
}

/// A submitted query whose reply is still outstanding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub query: String,
    pub pending: PendingId,
}

/// Mediates between the input field, the chat endpoint and the rendered log
pub struct ChatController<T, V> {
    transport: Arc<T>,
    view: Arc<V>,
}

impl<T, V> Clone for ChatController<T, V> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            view: Arc::clone(&self.view),
        }
    }
}

impl<T, V> ChatController<T, V>
where
    T: ChatTransport + 'static,
    V: ChatView + 'static,
{
    pub fn new(transport: Arc<T>, view: Arc<V>) -> Self {
        Self { transport, view }
    }

    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    /// Submit the current input. Returns the handle of the spawned request
    /// task, or `None` when the input was blank and nothing happened.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&self) -> Option<JoinHandle<()>> {
        let exchange = self.begin()?;
        let controller = self.clone();
        Some(tokio::spawn(async move {
            controller.settle(exchange).await;
        }))
    }

    /// Synchronous half of a submit: echo the query, clear the input and
    /// show the pending indicator.
    pub fn begin(&self) -> Option<PendingExchange> {
        let query = self.view.input_value().trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.view.append(Role::User, &query);
        self.view.clear_input();
        let pending = self.view.show_pending();
        self.view.scroll_to_bottom();

        debug!(query_len = query.len(), "query submitted");
        Some(PendingExchange { query, pending })
    }

    /// Asynchronous half of a submit: run the request and replace the
    /// pending indicator with the bot's reply.
    pub async fn settle(&self, exchange: PendingExchange) {
        let outcome = self.transport.ask(&exchange.query).await;
        let text = self.outcome_text(&outcome);
        self.view.resolve_pending(exchange.pending, Message::bot(text));
    }

    /// Run one exchange without touching the view
    pub async fn ask(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let outcome = self.transport.ask(query).await;
        Some(self.outcome_text(&outcome).into_owned())
    }

    fn outcome_text<'a>(&self, outcome: &'a Result<AskReply, AskError>) -> Cow<'a, str> {
        match outcome {
            Ok(reply) if reply.text().is_none() => {
                info!("reply had no response text");
            }
            Err(err) => {
                warn!(error = %err, "chat request failed");
            }
            Ok(_) => {}
        }
        reply_text(outcome)
    }
}
