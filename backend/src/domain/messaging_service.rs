//! Direct messaging between assigned patients and providers.
//!
//! Sending is gated on the current assignment edge, so unassigning a patient
//! immediately stops new messages in both directions. Existing messages stay
//! readable and deletable by their participants.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::access_policy::{MessageAction, can_mutate_message, can_send_message};
use super::ports::{
    MessageRepository, MessageRepositoryError, MessagesCommand, MessagesQuery, UserRepository,
};
use super::user_lookup::{find_user, resolve_caller};
use super::{
    Caller, Error, Message, MessageContent, MessageEnvelope, MessageId, Participant, UserId,
};

fn map_repository_error(error: MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        MessageRepositoryError::Query { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

fn message_not_found(id: &MessageId) -> Error {
    Error::not_found(format!("message {id} not found"))
}

/// Messaging service implementing [`MessagesCommand`] and [`MessagesQuery`].
#[derive(Clone)]
pub struct MessagingService<U, M> {
    users: Arc<U>,
    messages: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<U, M> MessagingService<U, M> {
    /// Create the service from its repositories and clock.
    pub fn new(users: Arc<U>, messages: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            messages,
            clock,
        }
    }
}

impl<U, M> MessagingService<U, M>
where
    U: UserRepository,
    M: MessageRepository,
{
    async fn load_for(
        &self,
        caller: &Caller,
        id: &MessageId,
        action: MessageAction,
    ) -> Result<Message, Error> {
        resolve_caller(self.users.as_ref(), caller).await?;
        let message = self
            .messages
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| message_not_found(id))?;
        can_mutate_message(&caller.id, &message, action)
            .require("not permitted to modify this message")?;
        Ok(message)
    }
}

#[async_trait]
impl<U, M> MessagesCommand for MessagingService<U, M>
where
    U: UserRepository,
    M: MessageRepository,
{
    async fn send_message(
        &self,
        caller: &Caller,
        receiver_id: &UserId,
        content: MessageContent,
    ) -> Result<Message, Error> {
        let sender = resolve_caller(self.users.as_ref(), caller).await?;
        let receiver = find_user(self.users.as_ref(), receiver_id)
            .await?
            .ok_or_else(|| Error::not_found("receiver not found"))?;
        can_send_message(&sender, &receiver)
            .require("messages are limited to an assigned patient and provider")?;

        let message = Message::new(sender.id, receiver.id, content, self.clock.utc());
        self.messages
            .insert(&message)
            .await
            .map_err(map_repository_error)?;
        info!(message_id = %message.id, sender_id = %sender.id, receiver_id = %receiver.id, "message sent");
        Ok(message)
    }

    async fn mark_read(&self, caller: &Caller, id: &MessageId) -> Result<Message, Error> {
        let message = self.load_for(caller, id, MessageAction::MarkRead).await?;
        if message.read {
            return Ok(message);
        }
        self.messages
            .mark_read(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| message_not_found(id))
    }

    async fn delete_message(&self, caller: &Caller, id: &MessageId) -> Result<(), Error> {
        self.load_for(caller, id, MessageAction::Delete).await?;
        let deleted = self
            .messages
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(message_not_found(id));
        }
        info!(message_id = %id, "message deleted");
        Ok(())
    }
}

#[async_trait]
impl<U, M> MessagesQuery for MessagingService<U, M>
where
    U: UserRepository,
    M: MessageRepository,
{
    async fn list_messages(&self, caller: &Caller) -> Result<Vec<MessageEnvelope>, Error> {
        let me = resolve_caller(self.users.as_ref(), caller).await?;
        let mut messages = self
            .messages
            .list_for_participant(&me.id)
            .await
            .map_err(map_repository_error)?;
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let counterparts: BTreeSet<UserId> = messages
            .iter()
            .flat_map(|message| [message.sender_id, message.receiver_id])
            .filter(|id| *id != me.id)
            .collect();
        let mut names = BTreeMap::from([(me.id, me.name.clone())]);
        for id in counterparts {
            if let Some(user) = find_user(self.users.as_ref(), &id).await? {
                names.insert(id, user.name);
            }
        }

        let participant = |id: UserId| {
            names
                .get(&id)
                .map(|name| Participant {
                    id,
                    name: name.clone(),
                })
        };
        Ok(messages
            .into_iter()
            .filter_map(|message| {
                let (Some(sender), Some(receiver)) =
                    (participant(message.sender_id), participant(message.receiver_id))
                else {
                    warn!(message_id = %message.id, "skipping message with unknown participant");
                    return None;
                };
                Some(MessageEnvelope {
                    message,
                    sender,
                    receiver,
                })
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "messaging_service_tests.rs"]
mod tests;
