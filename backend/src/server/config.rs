//! HTTP server configuration object.

use std::net::SocketAddr;

use careline::outbound::persistence::DbPool;
use chrono::Duration;
use zeroize::Zeroizing;

/// Everything [`super::create_server`] needs besides the health state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Configuration backed by the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, token_secret: Zeroizing<Vec<u8>>, token_ttl: Duration) -> Self {
        Self {
            bind_addr,
            token_secret,
            token_ttl,
            db_pool: None,
        }
    }

    /// Persist through PostgreSQL instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
