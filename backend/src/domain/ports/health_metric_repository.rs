//! Port for health metric persistence.

use async_trait::async_trait;

use crate::domain::{HealthMetric, MetricQuery, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by health metric repository adapters.
    pub enum HealthMetricRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "health metric repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "health metric repository query failed: {message}",
    }
}

/// Storage for patient measurements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthMetricRepository: Send + Sync {
    /// Persist a new metric.
    async fn insert(&self, metric: &HealthMetric) -> Result<(), HealthMetricRepositoryError>;

    /// A patient's metrics, newest first, filtered and capped by `query`.
    async fn list_for_patient(
        &self,
        patient_id: &UserId,
        query: &MetricQuery,
    ) -> Result<Vec<HealthMetric>, HealthMetricRepositoryError>;
}
