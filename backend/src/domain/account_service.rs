//! Registration, login, and bearer-token resolution.
//!
//! Passwords are hashed through the [`PasswordHasher`] port and tokens are
//! minted through [`SessionTokens`], so the service itself never sees key
//! material or hashing parameters.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use super::ports::{
    AccountCommand, NewUser, PasswordHasher, PasswordHasherError, SessionTokenError,
    SessionTokens, SessionVerifier, UserRepository, UserRepositoryError,
};
use super::user_lookup::map_user_repository_error;
use super::{AuthSession, Caller, Error, LoginCredentials, Registration, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_token_error(error: SessionTokenError) -> Error {
    match error {
        SessionTokenError::Signing { message } => {
            Error::internal(format!("token signing failed: {message}"))
        }
        SessionTokenError::Expired => Error::unauthorized("session has expired"),
        SessionTokenError::Malformed | SessionTokenError::BadSignature => {
            Error::unauthorized("invalid bearer token")
        }
    }
}

/// Account service implementing [`AccountCommand`] and [`SessionVerifier`].
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn SessionTokens>,
    clock: Arc<dyn Clock>,
}

impl<U> AccountService<U> {
    /// Create the service from its collaborators.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn SessionTokens>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let token = self
            .tokens
            .issue(&Caller::for_user(&user))
            .map_err(map_token_error)?;
        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hasher_error)?;
        let new_user = NewUser {
            id: UserId::random(),
            name: registration.name().clone(),
            email: registration.email().clone(),
            password_hash,
            profile: registration.profile().clone(),
            created_at: self.clock.utc(),
        };

        let user = self
            .users
            .insert(&new_user)
            .await
            .map_err(|err| match err {
                UserRepositoryError::DuplicateEmail { .. } => {
                    Error::conflict("email already registered")
                        .with_details(json!({ "field": "email", "code": "duplicate_email" }))
                }
                other => map_user_repository_error(other),
            })?;

        info!(user_id = %user.id, role = %user.role(), "registered user");
        self.session_for(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
        else {
            info!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hasher_error)?;
        if !matches {
            info!(user_id = %stored.user.id, "login rejected: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.session_for(stored.user)
    }
}

impl<U> SessionVerifier for AccountService<U>
where
    U: UserRepository,
{
    fn authenticate(&self, token: &str) -> Result<Caller, Error> {
        self.tokens.verify(token).map_err(|err| {
            warn!(error = %err, "bearer token rejected");
            map_token_error(err)
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
