//! Driving ports for direct messaging.

use async_trait::async_trait;

use crate::domain::{Caller, Error, Message, MessageContent, MessageEnvelope, MessageId, UserId};

/// Message mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagesCommand: Send + Sync {
    /// Send `content` to `receiver_id`.
    async fn send_message(
        &self,
        caller: &Caller,
        receiver_id: &UserId,
        content: MessageContent,
    ) -> Result<Message, Error>;

    /// Flag a received message as read.
    async fn mark_read(&self, caller: &Caller, id: &MessageId) -> Result<Message, Error>;

    /// Delete a sent or received message.
    async fn delete_message(&self, caller: &Caller, id: &MessageId) -> Result<(), Error>;
}

/// Message reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagesQuery: Send + Sync {
    /// Everything the caller sent or received, newest first.
    async fn list_messages(&self, caller: &Caller) -> Result<Vec<MessageEnvelope>, Error>;
}
