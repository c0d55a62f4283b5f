//! Bearer authentication for HTTP handlers.
//!
//! Handlers take an [`AuthenticatedCaller`] argument; extraction verifies the
//! `Authorization: Bearer` token before any handler code or policy check
//! runs, so an invalid or expired token always yields 401.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::error;

use crate::domain::{Caller, Error};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The verified identity behind the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedCaller(pub Caller);

impl AuthenticatedCaller {
    /// Borrow the verified caller.
    #[must_use]
    pub const fn caller(&self) -> &Caller {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("invalid bearer token"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("invalid bearer token"))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedCaller, Error> {
    let state = req.app_data::<web::Data<HttpState>>().ok_or_else(|| {
        error!("HttpState missing from app data");
        Error::internal("authentication is not configured")
    })?;
    let token = bearer_token(req)?;
    state.sessions.authenticate(token).map(AuthenticatedCaller)
}

impl FromRequest for AuthenticatedCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
