//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection is an `invalid_request` error whose `details` name the
//! offending field and a stable machine-readable code.

use serde_json::json;

use crate::domain::{Error, MessageId, ProfileUpdateError, UserId};

/// Newtype wrapper for request field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Build a 400 error pointing at `field`.
pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
        "field": name,
        "value": value,
        "code": "invalid_uuid",
    }))
}

/// Map a rejected profile edit onto a 400.
pub(crate) fn profile_update_error(err: &ProfileUpdateError) -> Error {
    let code = match err {
        ProfileUpdateError::Empty => "empty_update",
        ProfileUpdateError::TooManyEntries { .. } => "too_many_entries",
        ProfileUpdateError::EntryTooLong { .. } => "entry_too_long",
        ProfileUpdateError::User(_) => "invalid_value",
    };
    match err.field() {
        Some(field) => field_error(field, code, err.to_string()),
        None => Error::invalid_request(err.to_string()).with_details(json!({ "code": code })),
    }
}

/// Parse a path segment into a user id.
pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a path segment into a message id.
pub(crate) fn parse_message_id(value: &str, field: FieldName) -> Result<MessageId, Error> {
    uuid::Uuid::parse_str(value.trim())
        .map(MessageId::from_uuid)
        .map_err(|_| invalid_uuid_error(field, value))
}
