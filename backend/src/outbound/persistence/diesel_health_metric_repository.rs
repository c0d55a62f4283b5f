//! PostgreSQL-backed [`HealthMetricRepository`].

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{HealthMetricRepository, HealthMetricRepositoryError};
use crate::domain::{HealthMetric, HealthMetricId, MetricQuery, MetricType, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{HealthMetricRow, NewHealthMetricRow};
use super::pool::{DbPool, PoolError};
use super::schema::health_metrics;

/// Diesel-backed health metric repository.
#[derive(Clone)]
pub struct DieselHealthMetricRepository {
    pool: DbPool,
}

impl DieselHealthMetricRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> HealthMetricRepositoryError {
    map_pool_error(error, HealthMetricRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> HealthMetricRepositoryError {
    map_diesel_error(
        error,
        HealthMetricRepositoryError::query,
        HealthMetricRepositoryError::connection,
    )
}

fn row_to_metric(row: HealthMetricRow) -> Result<HealthMetric, HealthMetricRepositoryError> {
    let metric_type = MetricType::from_str(&row.metric_type).map_err(|err| {
        HealthMetricRepositoryError::query(format!("stored metric has invalid type: {err}"))
    })?;
    Ok(HealthMetric {
        id: HealthMetricId::from_uuid(row.id),
        patient_id: UserId::from_uuid(row.patient_id),
        metric_type,
        value: row.value,
        unit: row.unit,
        notes: row.notes,
        timestamp: row.recorded_at,
    })
}

#[async_trait]
impl HealthMetricRepository for DieselHealthMetricRepository {
    async fn insert(&self, metric: &HealthMetric) -> Result<(), HealthMetricRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewHealthMetricRow {
            id: *metric.id.as_uuid(),
            patient_id: *metric.patient_id.as_uuid(),
            metric_type: metric.metric_type.as_str(),
            value: metric.value,
            unit: &metric.unit,
            notes: metric.notes.as_deref(),
            recorded_at: metric.timestamp,
        };
        diesel::insert_into(health_metrics::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: &UserId,
        query: &MetricQuery,
    ) -> Result<Vec<HealthMetric>, HealthMetricRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let mut statement = health_metrics::table
            .filter(health_metrics::patient_id.eq(patient_id.as_uuid()))
            .select(HealthMetricRow::as_select())
            .order((health_metrics::recorded_at.desc(), health_metrics::id.desc()))
            .limit(limit)
            .into_boxed();
        if let Some(metric_type) = query.metric_type {
            statement = statement.filter(health_metrics::metric_type.eq(metric_type.as_str()));
        }

        let rows: Vec<HealthMetricRow> = statement.load(&mut conn).await.map_err(diesel_error)?;
        rows.into_iter().map(row_to_metric).collect()
    }
}
