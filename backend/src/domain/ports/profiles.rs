//! Driving ports for reading and editing profiles.

use async_trait::async_trait;

use crate::domain::{Caller, Error, PatientProfileUpdate, ProviderProfileUpdate, User, UserId};

/// Profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// The caller's own account.
    async fn current_user(&self, caller: &Caller) -> Result<User, Error>;

    /// A patient profile, subject to the view rule.
    async fn patient_profile(&self, caller: &Caller, patient_id: &UserId) -> Result<User, Error>;

    /// A provider profile, subject to the view rule.
    async fn provider_profile(&self, caller: &Caller, provider_id: &UserId)
    -> Result<User, Error>;
}

/// Profile edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Edit the calling patient's own profile.
    async fn update_patient_profile(
        &self,
        caller: &Caller,
        patient_id: &UserId,
        update: PatientProfileUpdate,
    ) -> Result<User, Error>;

    /// Edit the calling provider's own profile.
    async fn update_provider_profile(
        &self,
        caller: &Caller,
        provider_id: &UserId,
        update: ProviderProfileUpdate,
    ) -> Result<User, Error>;
}
