//! Driving ports for a provider's patient roster.

use async_trait::async_trait;

use crate::domain::{Caller, Error, User, UserId};

/// Roster mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareTeamCommand: Send + Sync {
    /// Assign `patient_id` to `provider_id`. Returns the updated patient.
    async fn assign_patient(
        &self,
        caller: &Caller,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<User, Error>;

    /// Detach `patient_id` from `provider_id`. Returns the patient.
    async fn unassign_patient(
        &self,
        caller: &Caller,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<User, Error>;
}

/// Roster reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareTeamQuery: Send + Sync {
    /// The provider's assigned patients.
    async fn list_patients(&self, caller: &Caller, provider_id: &UserId)
    -> Result<Vec<User>, Error>;
}
