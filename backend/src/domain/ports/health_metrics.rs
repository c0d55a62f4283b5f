//! Driving ports for health metrics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Caller, Error, HealthMetric, MetricReading, MetricType, UserId};

/// Request to record one measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMetricRequest {
    /// Patient the measurement belongs to.
    pub patient_id: UserId,
    /// Validated reading.
    pub reading: MetricReading,
    /// Measurement time; defaults to now.
    pub taken_at: Option<DateTime<Utc>>,
}

/// Metric writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthMetricsCommand: Send + Sync {
    /// Record a measurement for the calling patient.
    async fn record_metric(
        &self,
        caller: &Caller,
        request: RecordMetricRequest,
    ) -> Result<HealthMetric, Error>;
}

/// Metric reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthMetricsQuery: Send + Sync {
    /// A patient's recent metrics, newest first.
    async fn list_metrics(
        &self,
        caller: &Caller,
        patient_id: &UserId,
        metric_type: Option<MetricType>,
    ) -> Result<Vec<HealthMetric>, Error>;
}
