//! Test helpers for inbound HTTP components.
//!
//! [`StateBuilder`] exposes one mock per driving port. Tests set the
//! expectations they need and leave the rest untouched; an unexpected call
//! panics, which is what a handler test wants.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, web};

use crate::Trace;
use crate::domain::ports::{
    MockAccountCommand, MockCareTeamCommand, MockCareTeamQuery, MockHealthMetricsCommand,
    MockHealthMetricsQuery, MockMessagesCommand, MockMessagesQuery, MockProfileCommand,
    MockProfileQuery, MockSessionVerifier,
};
use crate::domain::{Caller, Error, User};

use super::state::HttpState;

/// Mock-backed [`HttpState`] under construction.
#[derive(Default)]
pub struct StateBuilder {
    sessions: HashMap<String, Caller>,
    /// Registration and login expectations.
    pub accounts: MockAccountCommand,
    /// Profile read expectations.
    pub profiles: MockProfileQuery,
    /// Profile edit expectations.
    pub profile_updates: MockProfileCommand,
    /// Roster change expectations.
    pub care_team: MockCareTeamCommand,
    /// Roster read expectations.
    pub care_team_query: MockCareTeamQuery,
    /// Metric recording expectations.
    pub metrics: MockHealthMetricsCommand,
    /// Metric read expectations.
    pub metrics_query: MockHealthMetricsQuery,
    /// Message mutation expectations.
    pub messages: MockMessagesCommand,
    /// Inbox read expectations.
    pub messages_query: MockMessagesQuery,
}

impl StateBuilder {
    /// Accept `token` as a bearer token for `caller`.
    #[must_use]
    pub fn with_session(mut self, token: &str, caller: Caller) -> Self {
        self.sessions.insert(token.to_owned(), caller);
        self
    }

    /// Register a session for `user` under a token derived from its name.
    #[must_use]
    pub fn signed_in(self, user: &User) -> Self {
        let token = token_for(user);
        self.with_session(&token, Caller::for_user(user))
    }

    /// Finish the state.
    pub fn build(self) -> HttpState {
        let sessions = self.sessions;
        let mut verifier = MockSessionVerifier::new();
        verifier.expect_authenticate().returning(move |token| {
            sessions
                .get(token)
                .copied()
                .ok_or_else(|| Error::unauthorized("invalid bearer token"))
        });
        HttpState {
            accounts: Arc::new(self.accounts),
            sessions: Arc::new(verifier),
            profiles: Arc::new(self.profiles),
            profile_updates: Arc::new(self.profile_updates),
            care_team: Arc::new(self.care_team),
            care_team_query: Arc::new(self.care_team_query),
            metrics: Arc::new(self.metrics),
            metrics_query: Arc::new(self.metrics_query),
            messages: Arc::new(self.messages),
            messages_query: Arc::new(self.messages_query),
        }
    }
}

/// Bearer token [`StateBuilder::signed_in`] registers for `user`.
pub fn token_for(user: &User) -> String {
    format!("token-{}", user.id)
}

/// `Authorization` header carrying `user`'s test token.
pub fn auth_header(user: &User) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token_for(user)))
}

/// App with the full API mounted over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .configure(super::configure_api)
}
