//! Argon2id implementation of the [`PasswordHasher`] port.

use argon2::password_hash::{self, PasswordHash as EncodedHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version};
use rand::RngCore;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

const SALT_LEN: usize = 16;

/// Argon2id hasher producing PHC-format strings.
///
/// Verification reads the cost parameters from the stored hash, so raising
/// the cost only affects newly hashed passwords.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with explicit memory (KiB) and iteration costs.
    ///
    /// # Examples
    /// ```
    /// use careline::outbound::security::Argon2Hasher;
    ///
    /// assert!(Argon2Hasher::with_cost(1024, 1).is_ok());
    /// assert!(Argon2Hasher::with_cost(0, 1).is_err());
    /// ```
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, PasswordHasherError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(Self { params })
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let mut salt_bytes = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        let encoded = self
            .engine()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed = EncodedHash::new(hash.as_str())
            .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
        match self.engine().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::hash(err.to_string())),
        }
    }
}
