//! Domain primitives, policy, and services.
//!
//! Purpose: define the strongly typed care model (users, metrics, messages),
//! the access and relationship policy over the patient/provider graph, and
//! the services that implement the driving ports. Nothing in this module
//! depends on Actix, Diesel, or any other adapter framework.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - [`User`], [`UserProfile`], [`HealthMetric`], [`Message`]: entities.
//! - [`access_policy`]: pure allow/deny decisions.
//! - `*Service` types: driving port implementations.

pub mod access_policy;
mod account_service;
mod auth;
mod care_team_service;
pub mod error;
mod health_metric;
mod health_metrics_service;
mod message;
mod messaging_service;
pub mod ports;
mod profile_service;
mod profile_update;
#[cfg(test)]
pub(crate) mod test_fixtures;
mod trace_id;
mod user;
mod user_lookup;

pub use self::access_policy::{AccessDecision, MessageAction};
pub use self::account_service::AccountService;
pub use self::auth::{
    AuthSession, Caller, LoginCredentials, LoginValidationError, PASSWORD_MIN_LEN, PasswordHash,
    Registration, RegistrationDraft, RegistrationProfile, RegistrationValidationError,
    SessionToken,
};
pub use self::care_team_service::CareTeamService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::health_metric::{
    HealthMetric, HealthMetricId, METRIC_LIST_LIMIT, MetricQuery, MetricReading, MetricType,
    MetricValidationError, UnknownMetricType,
};
pub use self::health_metrics_service::HealthMetricsService;
pub use self::message::{
    Message, MessageContent, MessageEnvelope, MessageId, MessageValidationError, Participant,
};
pub use self::messaging_service::MessagingService;
pub use self::profile_service::ProfileService;
pub use self::profile_update::{
    PatientProfileDraft, PatientProfileUpdate, ProfileUpdateError, ProviderProfileUpdate,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, PatientDetails, PersonName, ProviderDetails, Role, Specialization, UnknownRole, User,
    UserId, UserProfile, UserValidationError,
};

