//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Suites that depend on the embedded cluster can be skipped where it cannot
//! start by setting `SKIP_TEST_CLUSTER`; otherwise setup failures panic so CI
//! breakage is not masked.

pub mod embedded_postgres;

/// Returns true when `SKIP_TEST_CLUSTER` is `1`, `true`, or `yes`.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Prints a skip marker and returns `None` when skipping is enabled.
/// Panics otherwise.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
