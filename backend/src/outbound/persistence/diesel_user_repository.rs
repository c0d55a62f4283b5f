//! PostgreSQL-backed [`UserRepository`].
//!
//! The care relationship is persisted only as `users.provider_id` on patient
//! rows. Provider rosters are selected from that column whenever a provider
//! is loaded, and assignment changes lock the patient row inside a
//! transaction before rewriting the edge.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    AssignmentOutcome, NewUser, StoredCredentials, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Email, PasswordHash, PatientDetails, PatientProfileUpdate, PersonName, ProviderDetails,
    ProviderProfileUpdate, RegistrationProfile, Role, Specialization, User, UserId, UserProfile,
};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, PatientProfileChangeset, ProviderProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> UserRepositoryError {
    UserRepositoryError::query(format!("stored user has invalid {field}: {err}"))
}

/// Result of the locked read-modify-write on a patient's edge.
enum EdgeChange {
    Missing,
    NotPatient,
    Updated(UserRow),
}

impl EdgeChange {
    async fn apply(
        conn: &mut AsyncPgConnection,
        patient_id: Uuid,
        new_edge: impl FnOnce(Option<Uuid>) -> Option<Uuid> + Send,
    ) -> Result<Self, diesel::result::Error> {
        let current: Option<(String, Option<Uuid>)> = users::table
            .find(patient_id)
            .select((users::role, users::provider_id))
            .for_update()
            .get_result(conn)
            .await
            .optional()?;
        let Some((role, edge)) = current else {
            return Ok(Self::Missing);
        };
        if role != Role::Patient.as_str() {
            return Ok(Self::NotPatient);
        }
        let row = diesel::update(users::table.find(patient_id))
            .set(users::provider_id.eq(new_edge(edge)))
            .returning(UserRow::as_returning())
            .get_result(conn)
            .await?;
        Ok(Self::Updated(row))
    }
}

async fn roster(
    conn: &mut AsyncPgConnection,
    provider_id: Uuid,
) -> Result<BTreeSet<UserId>, UserRepositoryError> {
    let ids: Vec<Uuid> = users::table
        .filter(users::provider_id.eq(provider_id))
        .select(users::id)
        .load(conn)
        .await
        .map_err(diesel_error)?;
    Ok(ids.into_iter().map(UserId::from_uuid).collect())
}

fn row_to_user(row: UserRow, patients: BTreeSet<UserId>) -> Result<User, UserRepositoryError> {
    let UserRow {
        id,
        name,
        email,
        password_hash: _,
        role: raw_role,
        date_of_birth,
        conditions,
        allergies,
        medications,
        specialization,
        provider_id,
        created_at,
    } = row;

    let role = Role::from_str(&raw_role).map_err(|err| corrupt("role", err))?;
    let profile = match role {
        Role::Patient => UserProfile::Patient(PatientDetails {
            date_of_birth: date_of_birth
                .ok_or_else(|| corrupt("date_of_birth", "missing for patient"))?,
            conditions,
            allergies,
            medications,
            provider_id: provider_id.map(UserId::from_uuid),
        }),
        Role::Provider => UserProfile::Provider(ProviderDetails {
            specialization: specialization
                .ok_or_else(|| corrupt("specialization", "missing for provider"))
                .and_then(|raw| {
                    Specialization::new(raw).map_err(|err| corrupt("specialization", err))
                })?,
            patients,
        }),
    };

    Ok(User {
        id: UserId::from_uuid(id),
        name: PersonName::new(name).map_err(|err| corrupt("name", err))?,
        email: Email::new(email).map_err(|err| corrupt("email", err))?,
        profile,
        created_at,
    })
}

/// Convert a row, loading the roster when it belongs to a provider.
async fn hydrate(conn: &mut AsyncPgConnection, row: UserRow) -> Result<User, UserRepositoryError> {
    let patients = if row.role == Role::Provider.as_str() {
        roster(conn, row.id).await?
    } else {
        BTreeSet::new()
    };
    row_to_user(row, patients)
}

fn edge_outcome(change: EdgeChange) -> Result<AssignmentOutcome, UserRepositoryError> {
    match change {
        EdgeChange::Missing => Ok(AssignmentOutcome::PatientNotFound),
        EdgeChange::NotPatient => Ok(AssignmentOutcome::NotAPatient),
        EdgeChange::Updated(row) => row_to_user(row, BTreeSet::new()).map(AssignmentOutcome::Applied),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (role, date_of_birth, specialization) = match &user.profile {
            RegistrationProfile::Patient { date_of_birth } => {
                (Role::Patient, Some(*date_of_birth), None)
            }
            RegistrationProfile::Provider { specialization } => {
                (Role::Provider, None, Some(specialization.as_str()))
            }
        };
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            name: user.name.as_str(),
            email: user.email.as_str(),
            password_hash: user.password_hash.as_str(),
            role: role.as_str(),
            date_of_birth,
            specialization,
            created_at: user.created_at,
        };

        let stored = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email.as_str())
                } else {
                    diesel_error(err)
                }
            })?;
        row_to_user(stored, BTreeSet::new())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        match row {
            Some(row) => hydrate(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let Some(row) = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
        else {
            return Ok(None);
        };
        let password_hash = PasswordHash::new(row.password_hash.clone());
        let user = hydrate(&mut conn, row).await?;
        Ok(Some(StoredCredentials {
            user,
            password_hash,
        }))
    }

    async fn update_patient_profile(
        &self,
        id: &UserId,
        update: &PatientProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = PatientProfileChangeset {
            name: update.name.as_ref().map(PersonName::as_str),
            date_of_birth: update.date_of_birth,
            conditions: update.conditions.as_deref(),
            allergies: update.allergies.as_deref(),
            medications: update.medications.as_deref(),
        };
        let row = diesel::update(
            users::table
                .find(id.as_uuid())
                .filter(users::role.eq(Role::Patient.as_str())),
        )
        .set(&changes)
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;
        row.map(|row| row_to_user(row, BTreeSet::new())).transpose()
    }

    async fn update_provider_profile(
        &self,
        id: &UserId,
        update: &ProviderProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = ProviderProfileChangeset {
            name: update.name.as_ref().map(PersonName::as_str),
            specialization: update.specialization.as_ref().map(Specialization::as_str),
        };
        let row = diesel::update(
            users::table
                .find(id.as_uuid())
                .filter(users::role.eq(Role::Provider.as_str())),
        )
        .set(&changes)
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;
        match row {
            Some(row) => hydrate(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_patients(&self, provider_id: &UserId) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::provider_id.eq(provider_id.as_uuid()))
            .order((users::name.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| row_to_user(row, BTreeSet::new()))
            .collect()
    }

    async fn assign_patient(
        &self,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<AssignmentOutcome, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (provider, patient) = (*provider_id.as_uuid(), *patient_id.as_uuid());
        let change = conn
            .transaction(|conn| {
                async move { EdgeChange::apply(conn, patient, move |_| Some(provider)).await }
                    .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;
        edge_outcome(change)
    }

    async fn unassign_patient(
        &self,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<AssignmentOutcome, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (provider, patient) = (*provider_id.as_uuid(), *patient_id.as_uuid());
        let change = conn
            .transaction(|conn| {
                async move {
                    EdgeChange::apply(conn, patient, move |edge| {
                        edge.filter(|current| *current != provider)
                    })
                    .await
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;
        edge_outcome(change)
    }
}
