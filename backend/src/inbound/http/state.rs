//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they stay testable with mocks and without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, CareTeamCommand, CareTeamQuery, HealthMetricRepository, HealthMetricsCommand,
    HealthMetricsQuery, MessageRepository, MessagesCommand, MessagesQuery, PasswordHasher,
    ProfileCommand, ProfileQuery, SessionTokens, SessionVerifier, UserRepository,
};
use crate::domain::{
    AccountService, CareTeamService, HealthMetricsService, MessagingService, ProfileService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration and login.
    pub accounts: Arc<dyn AccountCommand>,
    /// Bearer token verification used by the caller extractor.
    pub sessions: Arc<dyn SessionVerifier>,
    /// Profile reads.
    pub profiles: Arc<dyn ProfileQuery>,
    /// Profile edits.
    pub profile_updates: Arc<dyn ProfileCommand>,
    /// Roster changes.
    pub care_team: Arc<dyn CareTeamCommand>,
    /// Provider rosters.
    pub care_team_query: Arc<dyn CareTeamQuery>,
    /// Metric recording.
    pub metrics: Arc<dyn HealthMetricsCommand>,
    /// Metric reads.
    pub metrics_query: Arc<dyn HealthMetricsQuery>,
    /// Message sends and edits.
    pub messages: Arc<dyn MessagesCommand>,
    /// Inbox reads.
    pub messages_query: Arc<dyn MessagesQuery>,
}

/// Driven adapters the domain services are assembled from.
pub struct StateAdapters<U, H, M> {
    /// User store.
    pub users: Arc<U>,
    /// Metric store.
    pub metrics: Arc<H>,
    /// Message store.
    pub messages: Arc<M>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Token issue and verification.
    pub tokens: Arc<dyn SessionTokens>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire every domain service over one set of adapters.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use careline::inbound::http::state::{HttpState, StateAdapters};
    /// use careline::outbound::memory::InMemoryStore;
    /// use careline::outbound::security::{Argon2Hasher, HmacSessionTokens};
    /// use mockable::DefaultClock;
    /// use zeroize::Zeroizing;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let clock = Arc::new(DefaultClock);
    /// let tokens = HmacSessionTokens::new(
    ///     Zeroizing::new(vec![7; 32]),
    ///     chrono::Duration::hours(1),
    ///     clock.clone(),
    /// );
    /// let state = HttpState::from_adapters(StateAdapters {
    ///     users: store.clone(),
    ///     metrics: store.clone(),
    ///     messages: store,
    ///     hasher: Arc::new(Argon2Hasher::default()),
    ///     tokens: Arc::new(tokens),
    ///     clock,
    /// });
    /// let _sessions = state.sessions.clone();
    /// ```
    pub fn from_adapters<U, H, M>(adapters: StateAdapters<U, H, M>) -> Self
    where
        U: UserRepository + 'static,
        H: HealthMetricRepository + 'static,
        M: MessageRepository + 'static,
    {
        let StateAdapters {
            users,
            metrics,
            messages,
            hasher,
            tokens,
            clock,
        } = adapters;

        let accounts = Arc::new(AccountService::new(
            users.clone(),
            hasher,
            tokens,
            clock.clone(),
        ));
        let profiles = Arc::new(ProfileService::new(users.clone()));
        let care_team = Arc::new(CareTeamService::new(users.clone()));
        let health = Arc::new(HealthMetricsService::new(
            users.clone(),
            metrics,
            clock.clone(),
        ));
        let messaging = Arc::new(MessagingService::new(users, messages, clock));

        Self {
            accounts: accounts.clone(),
            sessions: accounts,
            profiles: profiles.clone(),
            profile_updates: profiles,
            care_team: care_team.clone(),
            care_team_query: care_team,
            metrics: health.clone(),
            metrics_query: health,
            messages: messaging.clone(),
            messages_query: messaging,
        }
    }
}
