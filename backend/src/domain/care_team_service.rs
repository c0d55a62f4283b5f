//! Provider roster management.
//!
//! Assignment and unassignment are delegated to the repository as single
//! atomic writes; this service only enforces who may ask for them and
//! translates the outcome.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::access_policy::can_manage_roster;
use super::ports::{AssignmentOutcome, CareTeamCommand, CareTeamQuery, UserRepository};
use super::user_lookup::{map_user_repository_error, resolve_caller};
use super::{Caller, Error, User, UserId};

const ROSTER_DENIED: &str = "providers may only manage their own patients";

fn outcome_to_result(outcome: AssignmentOutcome, patient_id: &UserId) -> Result<User, Error> {
    match outcome {
        AssignmentOutcome::Applied(patient) => Ok(patient),
        AssignmentOutcome::PatientNotFound => {
            Err(Error::not_found(format!("patient {patient_id} not found")))
        }
        AssignmentOutcome::NotAPatient => Err(Error::invalid_request(
            "only patients can be assigned to a provider",
        )
        .with_details(json!({ "field": "patientId", "code": "not_a_patient" }))),
    }
}

/// Care team service implementing [`CareTeamCommand`] and [`CareTeamQuery`].
#[derive(Clone)]
pub struct CareTeamService<U> {
    users: Arc<U>,
}

impl<U> CareTeamService<U> {
    /// Create the service over the user repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

impl<U> CareTeamService<U>
where
    U: UserRepository,
{
    async fn authorise(&self, caller: &Caller, provider_id: &UserId) -> Result<User, Error> {
        can_manage_roster(caller, provider_id).require(ROSTER_DENIED)?;
        resolve_caller(self.users.as_ref(), caller).await
    }
}

#[async_trait]
impl<U> CareTeamCommand for CareTeamService<U>
where
    U: UserRepository,
{
    async fn assign_patient(
        &self,
        caller: &Caller,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<User, Error> {
        self.authorise(caller, provider_id).await?;
        let outcome = self
            .users
            .assign_patient(provider_id, patient_id)
            .await
            .map_err(map_user_repository_error)?;
        let patient = outcome_to_result(outcome, patient_id)?;
        info!(%provider_id, %patient_id, "patient assigned");
        Ok(patient)
    }

    async fn unassign_patient(
        &self,
        caller: &Caller,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<User, Error> {
        self.authorise(caller, provider_id).await?;
        let outcome = self
            .users
            .unassign_patient(provider_id, patient_id)
            .await
            .map_err(map_user_repository_error)?;
        let patient = outcome_to_result(outcome, patient_id)?;
        info!(%provider_id, %patient_id, "patient unassigned");
        Ok(patient)
    }
}

#[async_trait]
impl<U> CareTeamQuery for CareTeamService<U>
where
    U: UserRepository,
{
    async fn list_patients(
        &self,
        caller: &Caller,
        provider_id: &UserId,
    ) -> Result<Vec<User>, Error> {
        self.authorise(caller, provider_id).await?;
        let mut patients = self
            .users
            .list_patients(provider_id)
            .await
            .map_err(map_user_repository_error)?;
        patients.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()).then(a.id.cmp(&b.id)));
        Ok(patients)
    }
}

#[cfg(test)]
#[path = "care_team_service_tests.rs"]
mod tests;
