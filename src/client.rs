use crate::config::Config;
use crate::error::AskError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use tokio::time::Duration;
use tracing::{debug, warn};

/// Body of `POST /ask`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub user_query: String,
}

/// Decoded body of an `/ask` reply.
///
/// Any JSON value other than `null` counts as a reply; the fields are looked
/// up leniently because the endpoint's error bodies share the same route.
#[derive(Debug, Clone, PartialEq)]
pub struct AskReply {
    body: Value,
}

impl AskReply {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.body.get(name).and_then(Value::as_str)
    }

    /// The `response` field when it is truthy: non-empty strings as-is,
    /// non-zero numbers, `true`, and arrays or objects as compact JSON.
    /// `""`, `0`, `false`, `null` and a missing field give `None`.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self.body.get("response")? {
            Value::String(text) if !text.is_empty() => Some(Cow::Borrowed(text.as_str())),
            Value::Bool(true) => Some(Cow::Borrowed("true")),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(Cow::Owned(n.to_string())),
            value @ (Value::Array(_) | Value::Object(_)) => Some(Cow::Owned(value.to_string())),
            _ => None,
        }
    }

    /// Persistence status reported by the backend
    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    /// The query as the backend saw it after its own trimming
    pub fn user_query(&self) -> Option<&str> {
        self.str_field("user_query")
    }

    /// FastAPI-style `detail` carried by error bodies
    pub fn detail(&self) -> Option<&str> {
        self.str_field("detail")
    }
}

/// The remote side of the chat
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one query and decode the reply
    async fn ask(&self, query: &str) -> Result<AskReply, AskError>;
}

/// HTTP client for the assistant API
#[derive(Clone)]
pub struct AskClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl AskClient {
    pub fn new(config: &Config) -> Result<Self> {
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Client-side request timeout; `None` means the transport never gives up
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.endpoint, path)
    }

    /// Fetch the backend's welcome message from `GET /`
    pub async fn status(&self) -> Result<String, AskError> {
        let response = self.client.get(self.url("/")).send().await?;
        debug!(status = %response.status(), "status reply");

        let body = decode_body(&response.text().await?)?;
        body.get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AskError::MissingField("message"))
    }
}

#[async_trait]
impl ChatTransport for AskClient {
    async fn ask(&self, query: &str) -> Result<AskReply, AskError> {
        let url = self.url("/ask");
        debug!(%url, query_len = query.len(), "sending query");

        let request = AskRequest {
            user_query: query.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        // Status is not a failure on its own: error bodies are decoded too.
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "chat endpoint returned an error status");
        }

        let reply = AskReply::new(decode_body(&response.text().await?)?);
        debug!(
            %status,
            has_response = reply.text().is_some(),
            backend_status = reply.status().unwrap_or_default(),
            detail = reply.detail().unwrap_or_default(),
            "reply received"
        );

        Ok(reply)
    }
}

fn decode_body(body: &str) -> Result<Value, AskError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Null => Err(AskError::EmptyBody),
        value => Ok(value),
    }
}

/// Join a base URL and an absolute path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatBoard, ChatController, Role, SERVER_ERROR_TEXT};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AskClient {
        let config = Config {
            endpoint: server.uri(),
            ..Config::default()
        };
        AskClient::new(&config).unwrap()
    }

    #[test]
    fn join_url_trims_slashes() {
        assert_eq!(join_url("http://h:8000/", "/ask"), "http://h:8000/ask");
        assert_eq!(join_url("http://h:8000", "ask"), "http://h:8000/ask");
        assert_eq!(join_url("http://h/api//", "/"), "http://h/api/");
    }

    #[test]
    fn reply_text_shows_truthy_responses() {
        let text = |body: Value| AskReply::new(body).text().map(Cow::into_owned);

        assert_eq!(text(json!({"response": "hi"})).as_deref(), Some("hi"));
        assert_eq!(text(json!({"response": 42})).as_deref(), Some("42"));
        assert_eq!(text(json!({"response": -1.5})).as_deref(), Some("-1.5"));
        assert_eq!(text(json!({"response": true})).as_deref(), Some("true"));
        assert_eq!(text(json!({"response": [1, 2]})).as_deref(), Some("[1,2]"));
        assert_eq!(text(json!({"response": {"a": 1}})).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn reply_text_skips_falsy_responses() {
        for body in [
            json!({"response": ""}),
            json!({"response": 0}),
            json!({"response": 0.0}),
            json!({"response": false}),
            json!({"response": null}),
            json!({}),
            json!("just a string"),
            json!([1, 2]),
        ] {
            assert_eq!(AskReply::new(body.clone()).text(), None, "{body}");
        }
    }

    #[test]
    fn null_body_is_an_error() {
        assert!(matches!(decode_body("null"), Err(AskError::EmptyBody)));
        assert!(matches!(decode_body("<html>"), Err(AskError::Decode(_))));
        assert!(decode_body("{}").is_ok());
    }

    #[tokio::test]
    async fn posts_user_query_as_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"user_query": "Hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_query": "Hi",
                "response": "Hello!",
                "status": "✅ saved to chat_history"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).ask("Hi").await.unwrap();
        assert_eq!(reply.text().as_deref(), Some("Hello!"));
        assert_eq!(reply.user_query(), Some("Hi"));
        assert_eq!(reply.status(), Some("✅ saved to chat_history"));
    }

    #[tokio::test]
    async fn error_status_body_is_still_decoded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"detail": "Error: boom"})),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).ask("Hi").await.unwrap();
        assert!(reply.text().is_none());
        assert_eq!(reply.detail(), Some("Error: boom"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("Hi").await.unwrap_err();
        assert!(matches!(err, AskError::Decode(_)));
    }

    #[tokio::test]
    async fn configured_timeout_fails_slow_replies() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "too late"}))
                    .set_delay(Duration::from_millis(2500)),
            )
            .mount(&server)
            .await;

        let config = Config {
            endpoint: server.uri(),
            request_timeout_secs: Some(1),
            ..Config::default()
        };
        let client = AskClient::new(&config).unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(1)));

        let err = client.ask("Hi").await.unwrap_err();
        assert!(matches!(&err, AskError::Request(e) if e.is_timeout()), "{err}");

        let board = ChatBoard::new();
        let controller = ChatController::new(Arc::new(client), Arc::new(board.clone()));
        board.set_input("Hi");
        controller.submit().unwrap().await.unwrap();

        let log = board.log();
        assert_eq!(log.last_message_from(Role::Bot).unwrap().text(), SERVER_ERROR_TEXT);
        assert_eq!(log.pending_count(), 0);
    }

    #[tokio::test]
    async fn no_timeout_by_default() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "worth the wait"}))
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.timeout(), None);

        let reply = client.ask("Hi").await.unwrap();
        assert_eq!(reply.text().as_deref(), Some("worth the wait"));
    }

    #[tokio::test]
    async fn status_reads_welcome_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Welcome to the Product Info Assistant API"
            })))
            .mount(&server)
            .await;

        let message = client_for(&server).status().await.unwrap();
        assert_eq!(message, "Welcome to the Product Info Assistant API");
    }

    #[tokio::test]
    async fn status_without_message_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let err = client_for(&server).status().await.unwrap_err();
        assert!(matches!(err, AskError::MissingField("message")));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let config = Config {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = AskClient::new(&config).unwrap();

        let err = client.ask("Hi").await.unwrap_err();
        assert!(matches!(err, AskError::Request(_)));
    }
}
