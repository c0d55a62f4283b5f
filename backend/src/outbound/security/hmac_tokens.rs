//! HS256 bearer tokens implementing the [`SessionTokens`] port.
//!
//! Tokens use the compact `header.claims.signature` layout with unpadded
//! base64url segments. Claims carry the subject, role, and issue/expiry
//! times in Unix seconds.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{SessionTokenError, SessionTokens};
use crate::domain::{Caller, Role, SessionToken, UserId};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    iat: i64,
    exp: i64,
}

/// HMAC-SHA256 token issuer and verifier.
#[derive(Clone)]
pub struct HmacSessionTokens {
    key: Arc<Zeroizing<Vec<u8>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl HmacSessionTokens {
    /// Create an issuer signing with `key`; tokens live for `ttl`.
    pub fn new(key: Zeroizing<Vec<u8>>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: Arc::new(key),
            ttl,
            clock,
        }
    }

    fn mac(&self) -> Result<HmacSha256, SessionTokenError> {
        HmacSha256::new_from_slice(self.key.as_slice())
            .map_err(|err| SessionTokenError::signing(err.to_string()))
    }

    fn encode_json<T: Serialize>(value: &T) -> Result<String, SessionTokenError> {
        let json =
            serde_json::to_vec(value).map_err(|err| SessionTokenError::signing(err.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn decode_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, SessionTokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|_| SessionTokenError::malformed())?;
        serde_json::from_slice(&bytes).map_err(|_| SessionTokenError::malformed())
    }
}

impl SessionTokens for HmacSessionTokens {
    fn issue(&self, caller: &Caller) -> Result<SessionToken, SessionTokenError> {
        let issued_at = self.clock.utc().timestamp();
        let header = Self::encode_json(&Header {
            alg: ALGORITHM.to_owned(),
            typ: TOKEN_TYPE.to_owned(),
        })?;
        let claims = Self::encode_json(&Claims {
            sub: *caller.id.as_uuid(),
            role: caller.role,
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
        })?;
        let signing_input = format!("{header}.{claims}");
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(SessionToken::new(format!("{signing_input}.{signature}")))
    }

    fn verify(&self, token: &str) -> Result<Caller, SessionTokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(SessionTokenError::malformed());
        };

        let parsed_header: Header = Self::decode_json(header)?;
        if parsed_header.alg != ALGORITHM {
            return Err(SessionTokenError::malformed());
        }

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionTokenError::malformed())?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(claims.as_bytes());
        mac.verify_slice(&signature_bytes)
            .map_err(|_| SessionTokenError::bad_signature())?;

        let parsed_claims: Claims = Self::decode_json(claims)?;
        if parsed_claims.exp <= self.clock.utc().timestamp() {
            return Err(SessionTokenError::expired());
        }
        Ok(Caller {
            id: UserId::from_uuid(parsed_claims.sub),
            role: parsed_claims.role,
        })
    }
}
