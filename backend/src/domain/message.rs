//! Direct messages between a patient and their provider.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PersonName, UserId};

const CONTENT_MAX: usize = 5_000;

/// Identifier of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for message bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageValidationError {
    /// Body was blank once trimmed.
    #[error("message content must not be empty")]
    EmptyContent,
    /// Body was longer than allowed.
    #[error("message content must be at most {max} characters")]
    ContentTooLong {
        /// Maximum permitted characters.
        max: usize,
    },
}

/// Non-empty message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Validate a message body. Surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MessageValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MessageValidationError::EmptyContent);
        }
        if trimmed.chars().count() > CONTENT_MAX {
            return Err(MessageValidationError::ContentTooLong { max: CONTENT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for MessageContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifier.
    pub id: MessageId,
    /// Author.
    pub sender_id: UserId,
    /// Recipient.
    pub receiver_id: UserId,
    /// Body.
    pub content: MessageContent,
    /// Whether the receiver has marked it read.
    pub read: bool,
    /// Send time.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// New unread message.
    #[must_use]
    pub fn new(
        sender_id: UserId,
        receiver_id: UserId,
        content: MessageContent,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::random(),
            sender_id,
            receiver_id,
            content,
            read: false,
            timestamp,
        }
    }

    /// Whether `user` sent or received this message.
    #[must_use]
    pub fn involves(&self, user: &UserId) -> bool {
        self.sender_id == *user || self.receiver_id == *user
    }
}

/// Summary of a message participant for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Identifier.
    pub id: UserId,
    /// Display name.
    pub name: PersonName,
}

/// A message together with both participants' names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope {
    /// The message itself.
    pub message: Message,
    /// Sender summary.
    pub sender: Participant,
    /// Receiver summary.
    pub receiver: Participant,
}
