//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::CoreEvent;
use crate::input::InputEvent;
use crate::pipeline::{AssistantRequest, AssistantStatus};
use crate::state::CommandToken;

/// Largest accepted frame body
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Requests from collaborators to the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request a status snapshot
    GetStatus,

    /// Subscribe to core event notifications
    Subscribe,

    /// Final transcript from the speech recognizer
    Utterance { text: String },

    /// Text submitted from the text field
    Text { text: String },

    /// Run a command directly (dropdown buttons)
    Command { command: CommandToken },

    /// Approve the pending command
    Approve,

    /// Discard the pending command
    Reject,

    /// Toggle command confirmation
    SetConfirmation { enabled: bool },

    /// Toggle captions
    SetCaptions { enabled: bool },
}

impl Request {
    /// The assistant request this maps to, if it is not answered by the server
    pub fn into_assistant_request(self) -> Option<AssistantRequest> {
        match self {
            Request::Ping | Request::GetStatus | Request::Subscribe => None,
            Request::Utterance { text } => {
                Some(AssistantRequest::Input(InputEvent::Utterance(text)))
            }
            Request::Text { text } => Some(AssistantRequest::Input(InputEvent::Typed(text))),
            Request::Command { command } => Some(AssistantRequest::Command(command)),
            Request::Approve => Some(AssistantRequest::Approve),
            Request::Reject => Some(AssistantRequest::Reject),
            Request::SetConfirmation { enabled } => {
                Some(AssistantRequest::SetConfirmation(enabled))
            }
            Request::SetCaptions { enabled } => Some(AssistantRequest::SetCaptions(enabled)),
        }
    }
}

/// Responses from daemon to collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current assistant status
    Status(AssistantStatus),

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Request queued for the assistant
    Accepted,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Push notification to subscribed clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "event", rename_all = "snake_case")]
pub enum Notification {
    Event(CoreEvent),
}

/// Encode a length-prefixed JSON frame
pub fn encode_frame<T: Serialize>(msg: &T) -> serde_json::Result<Vec<u8>> {
    let body = serde_json::to_vec(msg)?;
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}
