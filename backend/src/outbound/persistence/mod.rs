//! PostgreSQL adapters built on Diesel.
//!
//! Repositories translate between the internal row structs in `models` and
//! validated domain values; neither `models` nor `schema` leaves this module.
//! Connections come from a `bb8` pool through `diesel-async`.
//!
//! # Example
//!
//! ```no_run
//! use careline::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), careline::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/careline")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_health_metric_repository;
mod diesel_message_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_health_metric_repository::DieselHealthMetricRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
