//! Domain ports.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`SessionTokens`]) are
//! implemented by outbound adapters. Driving ports are implemented by the
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account;
mod care_team;
mod health_metric_repository;
mod health_metrics;
mod message_repository;
mod messaging;
mod password_hasher;
mod profiles;
mod session_tokens;
mod user_repository;

#[cfg(test)]
pub use account::{MockAccountCommand, MockSessionVerifier};
pub use account::{AccountCommand, SessionVerifier};
#[cfg(test)]
pub use care_team::{MockCareTeamCommand, MockCareTeamQuery};
pub use care_team::{CareTeamCommand, CareTeamQuery};
#[cfg(test)]
pub use health_metric_repository::MockHealthMetricRepository;
pub use health_metric_repository::{HealthMetricRepository, HealthMetricRepositoryError};
#[cfg(test)]
pub use health_metrics::{MockHealthMetricsCommand, MockHealthMetricsQuery};
pub use health_metrics::{HealthMetricsCommand, HealthMetricsQuery, RecordMetricRequest};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessageRepository, MessageRepositoryError};
#[cfg(test)]
pub use messaging::{MockMessagesCommand, MockMessagesQuery};
pub use messaging::{MessagesCommand, MessagesQuery};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use profiles::{MockProfileCommand, MockProfileQuery};
pub use profiles::{ProfileCommand, ProfileQuery};
#[cfg(test)]
pub use session_tokens::MockSessionTokens;
pub use session_tokens::{SessionTokenError, SessionTokens};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    AssignmentOutcome, NewUser, StoredCredentials, UserRepository, UserRepositoryError,
};
