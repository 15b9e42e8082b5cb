//! Chat message types.
//!
//! A [`Message`] is created when the user submits a prompt (one user message
//! plus one agent placeholder) and is mutated in place, by id, as response
//! fragments arrive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the input field.
    User,
    /// The responder.
    Agent,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

/// Lifecycle of a message's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MessageStatus {
    /// Content is still being appended.
    Streaming,
    /// Content is final.
    Done,
    /// Delivery was stopped before the response finished.
    Cancelled,
    /// The responder reported an error.
    Failed { reason: String },
}

impl MessageStatus {
    /// Whether no further content changes are expected.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Streaming)
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique id, used for update-by-id.
    pub id: MessageId,
    /// Text content (grows while streaming).
    pub content: String,
    /// Author of the message.
    pub sender: Sender,
    /// Current lifecycle status.
    #[serde(flatten)]
    pub status: MessageStatus,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a finished user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            sender: Sender::User,
            status: MessageStatus::Done,
            created_at: Utc::now(),
        }
    }

    /// Create an empty agent message that is waiting for fragments.
    pub fn agent_placeholder() -> Self {
        Self {
            id: MessageId::new(),
            content: String::new(),
            sender: Sender::Agent,
            status: MessageStatus::Streaming,
            created_at: Utc::now(),
        }
    }

    /// The streaming flag: true while content is still being appended.
    pub fn is_streaming(&self) -> bool {
        self.status == MessageStatus::Streaming
    }

    /// Failure reason, if the response failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            MessageStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}
