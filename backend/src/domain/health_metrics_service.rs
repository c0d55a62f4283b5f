//! Recording and reading patient health metrics.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::debug;

use super::access_policy::{can_record_metric, can_view_metrics};
use super::ports::{
    HealthMetricRepository, HealthMetricRepositoryError, HealthMetricsCommand,
    HealthMetricsQuery, RecordMetricRequest, UserRepository,
};
use super::user_lookup::resolve_caller;
use super::{Caller, Error, HealthMetric, MetricQuery, MetricType, UserId};

/// Readings may be stamped slightly ahead of the server clock to absorb
/// client skew.
const FUTURE_SKEW_MINUTES: i64 = 5;

fn map_repository_error(error: HealthMetricRepositoryError) -> Error {
    match error {
        HealthMetricRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("health metric repository unavailable: {message}"))
        }
        HealthMetricRepositoryError::Query { message } => {
            Error::internal(format!("health metric repository error: {message}"))
        }
    }
}

/// Health metrics service implementing [`HealthMetricsCommand`] and
/// [`HealthMetricsQuery`].
#[derive(Clone)]
pub struct HealthMetricsService<U, M> {
    users: Arc<U>,
    metrics: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<U, M> HealthMetricsService<U, M> {
    /// Create the service from its repositories and clock.
    pub fn new(users: Arc<U>, metrics: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            metrics,
            clock,
        }
    }
}

#[async_trait]
impl<U, M> HealthMetricsCommand for HealthMetricsService<U, M>
where
    U: UserRepository,
    M: HealthMetricRepository,
{
    async fn record_metric(
        &self,
        caller: &Caller,
        request: RecordMetricRequest,
    ) -> Result<HealthMetric, Error> {
        can_record_metric(caller, &request.patient_id)
            .require("patients may only record their own metrics")?;
        resolve_caller(self.users.as_ref(), caller).await?;

        let now = self.clock.utc();
        let timestamp = request.taken_at.unwrap_or(now);
        if timestamp > now + Duration::minutes(FUTURE_SKEW_MINUTES) {
            return Err(Error::invalid_request("timestamp must not be in the future")
                .with_details(json!({ "field": "timestamp", "code": "in_future" })));
        }

        let metric = request.reading.into_metric(request.patient_id, timestamp);
        self.metrics
            .insert(&metric)
            .await
            .map_err(map_repository_error)?;
        debug!(
            patient_id = %metric.patient_id,
            metric_type = metric.metric_type.as_str(),
            "metric recorded"
        );
        Ok(metric)
    }
}

#[async_trait]
impl<U, M> HealthMetricsQuery for HealthMetricsService<U, M>
where
    U: UserRepository,
    M: HealthMetricRepository,
{
    async fn list_metrics(
        &self,
        caller: &Caller,
        patient_id: &UserId,
        metric_type: Option<MetricType>,
    ) -> Result<Vec<HealthMetric>, Error> {
        let viewer = resolve_caller(self.users.as_ref(), caller).await?;
        can_view_metrics(&viewer, patient_id)
            .require("not permitted to view this patient's metrics")?;

        let query = MetricQuery {
            metric_type,
            ..MetricQuery::default()
        };
        self.metrics
            .list_for_patient(patient_id, &query)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "health_metrics_service_tests.rs"]
mod tests;
