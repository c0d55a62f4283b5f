//! JSON views returned by the HTTP adapter.
//!
//! Domain types stay free of serde/utoipa wire concerns; these structs fix
//! the camelCase shape clients see. Password hashes never appear here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    AuthSession, HealthMetric, Message, MessageEnvelope, MetricType, Participant, Role, User,
    UserProfile,
};

/// Public view of a user.
///
/// Patient-only and provider-only fields are omitted for the other role.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email, lower-cased.
    pub email: String,
    /// `patient` or `provider`.
    #[schema(value_type = String, example = "patient")]
    pub role: Role,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Patient date of birth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Patient conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    /// Patient allergies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    /// Patient medications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<String>>,
    /// Assigned provider, for patients that have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<Uuid>,
    /// Provider specialty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    /// Assigned patient ids, for providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patients: Option<Vec<Uuid>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let mut view = Self {
            id: *user.id.as_uuid(),
            name: user.name.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            role: user.role(),
            created_at: user.created_at,
            date_of_birth: None,
            conditions: None,
            allergies: None,
            medications: None,
            provider_id: None,
            specialization: None,
            patients: None,
        };
        match &user.profile {
            UserProfile::Patient(details) => {
                view.date_of_birth = Some(details.date_of_birth);
                view.conditions = Some(details.conditions.clone());
                view.allergies = Some(details.allergies.clone());
                view.medications = Some(details.medications.clone());
                view.provider_id = details.provider_id.map(|id| *id.as_uuid());
            }
            UserProfile::Provider(details) => {
                view.specialization = Some(details.specialization.as_str().to_owned());
                view.patients = Some(details.patients.iter().map(|id| *id.as_uuid()).collect());
            }
        }
        view
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Token plus user returned by register and login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// Public view of the authenticated user.
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token.as_str().to_owned(),
            user: UserResponse::from(&session.user),
        }
    }
}

/// A recorded measurement.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricResponse {
    /// Metric id.
    pub id: Uuid,
    /// Owning patient.
    pub patient_id: Uuid,
    /// Measurement kind.
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "bloodSugar")]
    pub metric_type: MetricType,
    /// Measured value.
    pub value: f64,
    /// Unit of `value`.
    #[schema(example = "mg/dL")]
    pub unit: String,
    /// Free-text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
}

impl From<HealthMetric> for MetricResponse {
    fn from(metric: HealthMetric) -> Self {
        Self {
            id: *metric.id.as_uuid(),
            patient_id: *metric.patient_id.as_uuid(),
            metric_type: metric.metric_type,
            value: metric.value,
            unit: metric.unit,
            notes: metric.notes,
            timestamp: metric.timestamp,
        }
    }
}

/// A direct message.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    /// Message id.
    pub id: Uuid,
    /// Author.
    pub sender_id: Uuid,
    /// Recipient.
    pub receiver_id: Uuid,
    /// Message text.
    pub content: String,
    /// Whether the receiver has marked it read.
    pub read: bool,
    /// Send time.
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: *message.id.as_uuid(),
            sender_id: *message.sender_id.as_uuid(),
            receiver_id: *message.receiver_id.as_uuid(),
            content: message.content.as_str().to_owned(),
            read: message.read,
            timestamp: message.timestamp,
        }
    }
}

/// Id and display name of a message party.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantResponse {
    /// User id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            id: *participant.id.as_uuid(),
            name: participant.name.as_str().to_owned(),
        }
    }
}

/// A message with both parties' display names.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageListEntry {
    /// The message itself.
    #[serde(flatten)]
    pub message: MessageResponse,
    /// Author.
    pub sender: ParticipantResponse,
    /// Recipient.
    pub receiver: ParticipantResponse,
}

impl From<MessageEnvelope> for MessageListEntry {
    fn from(envelope: MessageEnvelope) -> Self {
        Self {
            message: envelope.message.into(),
            sender: envelope.sender.into(),
            receiver: envelope.receiver.into(),
        }
    }
}
