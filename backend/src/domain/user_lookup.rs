//! Shared user loading for the domain services.

use tracing::warn;

use super::ports::{UserRepository, UserRepositoryError};
use super::{Caller, Error, User, UserId};

/// Translate user repository failures into domain errors.
pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => Error::conflict("email already registered"),
    }
}

/// Fetch a user by id.
pub(crate) async fn find_user<U>(users: &U, id: &UserId) -> Result<Option<User>, Error>
where
    U: UserRepository + ?Sized,
{
    users.find_by_id(id).await.map_err(map_user_repository_error)
}

/// Load the caller's current record.
///
/// A valid token for an account that no longer resolves is treated as
/// unauthenticated.
pub(crate) async fn resolve_caller<U>(users: &U, caller: &Caller) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    match find_user(users, &caller.id).await? {
        Some(user) if user.role() == caller.role => Ok(user),
        Some(_) => {
            warn!(user_id = %caller.id, "token role does not match stored role");
            Err(Error::unauthorized("session is no longer valid"))
        }
        None => {
            warn!(user_id = %caller.id, "token subject no longer exists");
            Err(Error::unauthorized("session is no longer valid"))
        }
    }
}
