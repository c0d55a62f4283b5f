//! Port for message persistence.

use async_trait::async_trait;

use crate::domain::{Message, MessageId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "message repository query failed: {message}",
    }
}

/// Storage for direct messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message.
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError>;

    /// Fetch one message.
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError>;

    /// Every message `user` sent or received, newest first.
    async fn list_for_participant(
        &self,
        user: &UserId,
    ) -> Result<Vec<Message>, MessageRepositoryError>;

    /// Set the read flag. `None` when the message no longer exists.
    async fn mark_read(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError>;

    /// Remove a message. Returns whether a row was deleted.
    async fn delete(&self, id: &MessageId) -> Result<bool, MessageRepositoryError>;
}
