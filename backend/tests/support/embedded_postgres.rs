//! Embedded PostgreSQL provisioning for repository tests.
//!
//! One cluster is shared per test binary. Each test gets its own temporary
//! database with the crate's migrations applied, so suites never see each
//! other's rows.

use std::time::Duration;

use careline::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns the process-wide cluster, retrying transient bootstrap failures.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt}/{SHARED_CLUSTER_RETRIES} failed: {error:?}");
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

/// Creates an empty database on `cluster` and migrates it to the latest schema.
pub fn provision_migrated_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, String> {
    let name = format!("careline_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("create database: {err:?}"))?;
    run_pending_migrations(database.url()).map_err(|err| format!("migrate: {err}"))?;
    Ok(database)
}
