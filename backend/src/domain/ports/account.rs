//! Driving ports for registration, login, and bearer-token resolution.

use async_trait::async_trait;

use crate::domain::{AuthSession, Caller, Error, LoginCredentials, Registration};

/// Account lifecycle use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and sign it in.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Exchange credentials for a session.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;
}

/// Resolves a presented bearer token to the calling principal.
///
/// Failures are always `unauthorized`; the policy is never consulted for an
/// unauthenticated request.
#[cfg_attr(test, mockall::automock)]
pub trait SessionVerifier: Send + Sync {
    /// Verify `token` and return its caller.
    fn authenticate(&self, token: &str) -> Result<Caller, Error>;
}
