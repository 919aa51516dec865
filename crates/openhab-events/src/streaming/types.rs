//! Types for item event streams

use serde::Deserialize;
use thiserror::Error;

use crate::topic::ITEMS_TOPIC;

/// A single server-sent event received from the hub
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemEvent {
    /// Raw `data` payload (multiple data lines joined with `\n`)
    pub data: String,

    /// `event` field; `message` when the server sent none
    pub event_type: String,

    /// `id` field, if the server sent one
    pub id: Option<String>,
}

impl ItemEvent {
    pub(crate) fn from_message(data: String, event_type: String, id: String) -> Self {
        Self {
            data,
            event_type,
            id: Some(id).filter(|id| !id.is_empty()),
        }
    }

    /// Decode the payload as arbitrary JSON
    pub fn json(&self) -> StreamResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.data)?)
    }

    /// Decode the payload as an openHAB event envelope
    pub fn envelope(&self) -> StreamResult<EventEnvelope> {
        Ok(serde_json::from_str(&self.data)?)
    }
}

/// The JSON wrapper openHAB puts around every event
///
/// ```json
/// {"topic":"openhab/items/Lamp/statechanged",
///  "payload":"{\"type\":\"OnOff\",\"value\":\"ON\",\"oldType\":\"OnOff\",\"oldValue\":\"OFF\"}",
///  "type":"ItemStateChangedEvent"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventEnvelope {
    pub topic: String,

    /// Event body, itself JSON encoded as a string
    #[serde(default)]
    pub payload: String,

    #[serde(rename = "type")]
    pub event_type: String,
}

impl EventEnvelope {
    /// Item name taken from the topic
    ///
    /// For group member events this is the group name.
    pub fn item_name(&self) -> Option<&str> {
        self.topic
            .strip_prefix(ITEMS_TOPIC)?
            .strip_prefix('/')?
            .split('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Decode the string-encoded payload
    pub fn payload_json(&self) -> StreamResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}

/// Errors that can occur while subscribing or streaming
#[derive(Debug, Error)]
pub enum StreamError {
    /// HTTP/connection error
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Subscription URL could not be built
    #[error("Invalid stream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request could not be prepared for streaming
    #[error("Invalid request: {0}")]
    Request(#[from] reqwest_eventsource::CannotCloneRequestError),

    /// Server returned an error
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Server answered with something other than `text/event-stream`
    #[error("Unexpected content type: {0}")]
    InvalidContentType(String),

    /// Malformed SSE framing
    #[error("Parse error: {0}")]
    Parse(String),

    /// Server closed the connection before the stream opened
    #[error("Stream closed")]
    Closed,

    /// Event payload is not valid JSON
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest_eventsource::Error> for StreamError {
    fn from(err: reqwest_eventsource::Error) -> Self {
        use reqwest_eventsource::Error;

        match err {
            Error::Transport(e) => StreamError::Connection(e),
            Error::InvalidStatusCode(status, _) => StreamError::Server {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            },
            Error::InvalidContentType(value, _) => {
                StreamError::InvalidContentType(value.to_str().unwrap_or_default().to_string())
            }
            Error::StreamEnded => StreamError::Closed,
            other => StreamError::Parse(other.to_string()),
        }
    }
}

/// Result type for streaming operations
pub type StreamResult<T> = std::result::Result<T, StreamError>;
