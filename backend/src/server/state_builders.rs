//! Builds [`HttpState`] over PostgreSQL or the in-memory store.

use std::sync::Arc;

use careline::inbound::http::state::{HttpState, StateAdapters};
use careline::outbound::memory::InMemoryStore;
use careline::outbound::persistence::{
    DieselHealthMetricRepository, DieselMessageRepository, DieselUserRepository,
};
use careline::outbound::security::{Argon2Hasher, HmacSessionTokens};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use super::ServerConfig;

pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(HmacSessionTokens::new(
        config.token_secret.clone(),
        config.token_ttl,
        clock.clone(),
    ));
    let hasher = Arc::new(Argon2Hasher::default());

    match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL persistence");
            HttpState::from_adapters(StateAdapters {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                metrics: Arc::new(DieselHealthMetricRepository::new(pool.clone())),
                messages: Arc::new(DieselMessageRepository::new(pool.clone())),
                hasher,
                tokens,
                clock,
            })
        }
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            let store = Arc::new(InMemoryStore::new());
            HttpState::from_adapters(StateAdapters {
                users: store.clone(),
                metrics: store.clone(),
                messages: store,
                hasher,
                tokens,
                clock,
            })
        }
    }
}
