//! Port for issuing and verifying bearer tokens.

use crate::domain::{Caller, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum SessionTokenError {
        /// The token is not in the expected three-segment form.
        Malformed => "token is malformed",
        /// The signature does not match the payload.
        BadSignature => "token signature is invalid",
        /// The token is past its expiry.
        Expired => "token has expired",
        /// Signing failed while issuing a token.
        Signing {
            /// Adapter-supplied detail.
            message: String,
        } => "token signing failed: {message}",
    }
}

/// Issues signed bearer tokens and resolves them back to a caller.
#[cfg_attr(test, mockall::automock)]
pub trait SessionTokens: Send + Sync {
    /// Issue a token for `caller`.
    fn issue(&self, caller: &Caller) -> Result<SessionToken, SessionTokenError>;

    /// Verify a presented token and return its caller.
    fn verify(&self, token: &str) -> Result<Caller, SessionTokenError>;
}
