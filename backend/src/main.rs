//! Backend entry-point: loads settings, prepares storage, and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use careline::inbound::http::health::HealthState;
use careline::inbound::http::token_config::{BuildMode, token_secret_from_process_env};
use careline::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use careline::settings::ServerSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_address().map_err(std::io::Error::other)?;
    let token_ttl = settings.token_ttl().map_err(std::io::Error::other)?;
    let token_secret = token_secret_from_process_env(BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr, token_secret, token_ttl);
    if let Some(database_url) = settings.database_url() {
        config = config.with_db_pool(prepare_database(database_url, settings.max_connections).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}

async fn prepare_database(database_url: &str, max_connections: u32) -> std::io::Result<DbPool> {
    let url = database_url.to_owned();
    let applied = web::block(move || run_pending_migrations(&url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations complete");

    DbPool::new(PoolConfig::new(database_url).with_max_size(max_connections))
        .await
        .map_err(std::io::Error::other)
}
