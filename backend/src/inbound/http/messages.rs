//! Messaging API handlers.
//!
//! ```text
//! GET /api/messages
//! POST /api/messages {"receiverId":"...","content":"See you Tuesday"}
//! PATCH /api/messages/{messageId}/read
//! DELETE /api/messages/{messageId}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{MessageContent, MessageValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::dto::{MessageListEntry, MessageResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, parse_message_id, parse_user_id,
};

const RECEIVER_ID: FieldName = FieldName::new("receiverId");
const MESSAGE_ID: FieldName = FieldName::new("messageId");

/// Body for `POST /api/messages`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    /// Recipient user id.
    pub receiver_id: String,
    /// Message text, at most 5000 characters.
    #[schema(example = "See you Tuesday")]
    pub content: String,
}

fn content_error(err: &MessageValidationError) -> crate::domain::Error {
    let code = match err {
        MessageValidationError::EmptyContent => "empty",
        MessageValidationError::ContentTooLong { .. } => "too_long",
    };
    field_error("content", code, err.to_string())
}

/// List every message the caller sent or received, newest first.
#[utoipa::path(
    get,
    path = "/api/messages",
    responses(
        (status = 200, description = "Messages with participant names", body = [MessageListEntry]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
) -> ApiResult<web::Json<Vec<MessageListEntry>>> {
    let envelopes = state.messages_query.list_messages(caller.caller()).await?;
    Ok(web::Json(
        envelopes.into_iter().map(MessageListEntry::from).collect(),
    ))
}

/// Send a message to the caller's assigned counterpart.
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageBody,
    responses(
        (status = 201, description = "Message stored unread", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "No assignment between the parties", body = ErrorSchema),
        (status = 404, description = "Receiver not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    payload: web::Json<SendMessageBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let receiver_id = parse_user_id(&body.receiver_id, RECEIVER_ID)?;
    let content = MessageContent::new(body.content).map_err(|err| content_error(&err))?;
    let message = state
        .messages
        .send_message(caller.caller(), &receiver_id, content)
        .await?;
    Ok(HttpResponse::Created().json(MessageResponse::from(message)))
}

/// Mark a received message as read.
#[utoipa::path(
    patch,
    path = "/api/messages/{messageId}/read",
    params(("messageId" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Updated message", body = MessageResponse),
        (status = 403, description = "Only the receiver may mark a message read", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "markMessageRead"
)]
#[patch("/messages/{messageId}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = parse_message_id(&path.into_inner(), MESSAGE_ID)?;
    let message = state.messages.mark_read(caller.caller(), &id).await?;
    Ok(web::Json(MessageResponse::from(message)))
}

/// Delete a message the caller sent or received.
#[utoipa::path(
    delete,
    path = "/api/messages/{messageId}",
    params(("messageId" = String, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Caller is not a participant", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "deleteMessage"
)]
#[delete("/messages/{messageId}")]
pub async fn delete_message(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_message_id(&path.into_inner(), MESSAGE_ID)?;
    state.messages.delete_message(caller.caller(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
