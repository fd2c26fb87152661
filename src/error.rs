use thiserror::Error;

/// Failures of one request/response cycle with the chat endpoint
#[derive(Error, Debug)]
pub enum AskError {
    /// Connection, DNS, TLS or body transfer failure
    #[error("request to chat endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body was not valid JSON
    #[error("chat endpoint returned a non-JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Body was JSON `null`, so no field can be read from it
    #[error("chat endpoint returned a null body")]
    EmptyBody,

    /// A required field was absent from the reply
    #[error("chat endpoint reply has no `{0}` field")]
    MissingField(&'static str),
}
