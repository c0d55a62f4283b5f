//! Port for user persistence and the patient/provider relationship graph.
//!
//! Adapters store one assignment edge per patient. When returning a
//! provider they derive `patients` from those edges, and they apply
//! [`UserRepository::assign_patient`] and [`UserRepository::unassign_patient`]
//! as single atomic writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Email, PasswordHash, PatientProfileUpdate, PersonName, ProviderProfileUpdate,
    RegistrationProfile, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "user repository query failed: {message}",
        /// Another account already uses this email address.
        DuplicateEmail {
            /// The conflicting address.
            email: String,
        } =>
            "email already registered: {email}",
    }
}

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Identifier chosen by the service.
    pub id: UserId,
    /// Display name.
    pub name: PersonName,
    /// Normalised email.
    pub email: Email,
    /// Encoded password hash.
    pub password_hash: PasswordHash,
    /// Role-specific fields.
    pub profile: RegistrationProfile,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A user together with their stored credential.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The user.
    pub user: User,
    /// Encoded password hash.
    pub password_hash: PasswordHash,
}

/// Result of an assignment-graph write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// The edge was written (or already in the requested state); carries the
    /// patient as stored afterwards.
    Applied(User),
    /// No user exists with the given patient id.
    PatientNotFound,
    /// The id resolves to a provider, which cannot be assigned.
    NotAPatient,
}

/// Port for user storage and the assignment graph.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` when taken.
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch a user by id; providers come back with their derived roster.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user and password hash by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Apply a patient profile edit. `None` when no patient has this id.
    async fn update_patient_profile(
        &self,
        id: &UserId,
        update: &PatientProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Apply a provider profile edit. `None` when no provider has this id.
    async fn update_provider_profile(
        &self,
        id: &UserId,
        update: &ProviderProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Patients currently assigned to `provider_id`, ordered by name.
    async fn list_patients(&self, provider_id: &UserId) -> Result<Vec<User>, UserRepositoryError>;

    /// Point the patient's edge at `provider_id`, atomically.
    ///
    /// Re-assigning to the same provider is a no-op; assigning to a new
    /// provider moves the edge.
    async fn assign_patient(
        &self,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<AssignmentOutcome, UserRepositoryError>;

    /// Clear the patient's edge if, and only if, it points at `provider_id`.
    async fn unassign_patient(
        &self,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<AssignmentOutcome, UserRepositoryError>;
}
