//! Inbound request events and shortcut commands.

use crate::query::QueryRequest;
use datawire_estimate::Header;
use datawire_types::Direction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request lifecycle event from the network observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RequestEvent {
    /// Request headers are about to be sent.
    #[serde(rename_all = "camelCase")]
    BeforeSendHeaders {
        /// Request URL.
        url: String,
        /// HTTP method.
        #[serde(default)]
        method: Option<String>,
        /// Request headers.
        #[serde(default)]
        request_headers: Vec<Header>,
    },

    /// Response headers arrived.
    #[serde(rename_all = "camelCase")]
    HeadersReceived {
        /// Request URL.
        url: String,
        /// Response headers.
        #[serde(default)]
        response_headers: Vec<Header>,
    },

    /// The request finished.
    #[serde(rename_all = "camelCase")]
    Completed {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status_code: u16,
        /// Response headers, if the observer provided them.
        #[serde(default)]
        response_headers: Option<Vec<Header>>,
    },

    /// A transfer with a known size.
    Transfer {
        /// Transfer direction.
        direction: Direction,
        /// Byte count; anything but a positive integer is dropped.
        bytes: f64,
        /// URL the transfer belongs to.
        url: String,
    },
}

impl RequestEvent {
    /// Returns the URL the event refers to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::BeforeSendHeaders { url, .. }
            | Self::HeadersReceived { url, .. }
            | Self::Completed { url, .. }
            | Self::Transfer { url, .. } => url,
        }
    }
}

/// Returns true if a completed response with `status` should fall back to
/// the URL-based size estimate.
///
/// Every 2xx status except 204 (No Content) and 205 (Reset Content).
#[must_use]
pub const fn status_allows_fallback(status: u16) -> bool {
    matches!(status, 200..=299) && status != 204 && status != 205
}

/// Keyboard shortcut commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ShortcutCommand {
    /// Reset the current session.
    ResetSession,
    /// Any command the engine does not handle.
    #[serde(other)]
    Unsupported,
}

/// One inbound message, classified by its discriminating key.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// A request lifecycle event (`"event"` key).
    Event(RequestEvent),
    /// A UI query (`"action"` key, or no recognized key).
    Query(QueryRequest),
    /// A shortcut command (`"command"` key).
    Command(ShortcutCommand),
}

impl InboundMessage {
    /// Parses one JSON message.
    ///
    /// Objects with an `event` key are request events, objects with a
    /// `command` key are shortcut commands, and everything else is treated as
    /// a query (an unrecognized query answers with an error response).
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not JSON or an event is malformed.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(line)?;

        if value.get("event").is_some() {
            serde_json::from_value(value).map(Self::Event)
        } else if value.get("command").is_some() {
            serde_json::from_value(value).map(Self::Command)
        } else {
            Ok(Self::Query(QueryRequest::from_value(value)))
        }
    }
}
