//! Port for one-way password hashing.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Producing a hash failed.
        Hash {
            /// Adapter-supplied detail.
            message: String,
        } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash {
            /// Adapter-supplied detail.
            message: String,
        } => "stored password hash is malformed: {message}",
    }
}

/// Hashes and verifies password credentials.
///
/// Hashing is CPU-bound and synchronous; adapters should keep parameters
/// tuned for interactive logins.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plain-text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check a plain-text password against a stored hash.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;
}
