//! Profile reads and self-service edits.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::access_policy::{can_update_profile, can_view_profile};
use super::ports::{ProfileCommand, ProfileQuery, UserRepository};
use super::user_lookup::{find_user, map_user_repository_error, resolve_caller};
use super::{Caller, Error, PatientProfileUpdate, ProviderProfileUpdate, Role, User, UserId};

/// Profile service implementing [`ProfileQuery`] and [`ProfileCommand`].
#[derive(Clone)]
pub struct ProfileService<U> {
    users: Arc<U>,
}

impl<U> ProfileService<U> {
    /// Create the service over the user repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

impl<U> ProfileService<U>
where
    U: UserRepository,
{
    async fn view(&self, caller: &Caller, target_id: &UserId, role: Role) -> Result<User, Error> {
        let viewer = resolve_caller(self.users.as_ref(), caller).await?;
        let target = match find_user(self.users.as_ref(), target_id).await? {
            Some(target) if target.role() == role => target,
            _ => return Err(Error::not_found(format!("{role} {target_id} not found"))),
        };
        can_view_profile(&viewer, &target).require("not permitted to view this profile")?;
        Ok(target)
    }
}

#[async_trait]
impl<U> ProfileQuery for ProfileService<U>
where
    U: UserRepository,
{
    async fn current_user(&self, caller: &Caller) -> Result<User, Error> {
        resolve_caller(self.users.as_ref(), caller).await
    }

    async fn patient_profile(&self, caller: &Caller, patient_id: &UserId) -> Result<User, Error> {
        self.view(caller, patient_id, Role::Patient).await
    }

    async fn provider_profile(
        &self,
        caller: &Caller,
        provider_id: &UserId,
    ) -> Result<User, Error> {
        self.view(caller, provider_id, Role::Provider).await
    }
}

#[async_trait]
impl<U> ProfileCommand for ProfileService<U>
where
    U: UserRepository,
{
    async fn update_patient_profile(
        &self,
        caller: &Caller,
        patient_id: &UserId,
        update: PatientProfileUpdate,
    ) -> Result<User, Error> {
        can_update_profile(caller, patient_id, Role::Patient)
            .require("patients may only edit their own profile")?;
        let user = self
            .users
            .update_patient_profile(patient_id, &update)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized("session is no longer valid"))?;
        info!(user_id = %user.id, "patient profile updated");
        Ok(user)
    }

    async fn update_provider_profile(
        &self,
        caller: &Caller,
        provider_id: &UserId,
        update: ProviderProfileUpdate,
    ) -> Result<User, Error> {
        can_update_profile(caller, provider_id, Role::Provider)
            .require("providers may only edit their own profile")?;
        let user = self
            .users
            .update_provider_profile(provider_id, &update)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized("session is no longer valid"))?;
        info!(user_id = %user.id, "provider profile updated");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;
