//! PostgreSQL-backed [`MessageRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{Message, MessageContent, MessageId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::MessageRow;
use super::pool::{DbPool, PoolError};
use super::schema::messages;

/// Diesel-backed message repository.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MessageRepositoryError {
    map_pool_error(error, MessageRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MessageRepositoryError {
    map_diesel_error(
        error,
        MessageRepositoryError::query,
        MessageRepositoryError::connection,
    )
}

fn row_to_message(row: MessageRow) -> Result<Message, MessageRepositoryError> {
    let content = MessageContent::new(&row.content).map_err(|err| {
        MessageRepositoryError::query(format!("stored message has invalid content: {err}"))
    })?;
    Ok(Message {
        id: MessageId::from_uuid(row.id),
        sender_id: UserId::from_uuid(row.sender_id),
        receiver_id: UserId::from_uuid(row.receiver_id),
        content,
        read: row.read,
        timestamp: row.sent_at,
    })
}

impl From<&Message> for MessageRow {
    fn from(message: &Message) -> Self {
        Self {
            id: *message.id.as_uuid(),
            sender_id: *message.sender_id.as_uuid(),
            receiver_id: *message.receiver_id.as_uuid(),
            content: message.content.as_str().to_owned(),
            read: message.read,
            sent_at: message.timestamp,
        }
    }
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(messages::table)
            .values(MessageRow::from(message))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = messages::table
            .find(id.as_uuid())
            .select(MessageRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_message).transpose()
    }

    async fn list_for_participant(
        &self,
        user: &UserId,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<MessageRow> = messages::table
            .filter(
                messages::sender_id
                    .eq(user.as_uuid())
                    .or(messages::receiver_id.eq(user.as_uuid())),
            )
            .order((messages::sent_at.desc(), messages::id.desc()))
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }

    async fn mark_read(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::update(messages::table.find(id.as_uuid()))
            .set(messages::read.eq(true))
            .returning(MessageRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_message).transpose()
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(messages::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
