//! Health metrics recorded by patients.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum number of metrics returned by a listing, newest first.
pub const METRIC_LIST_LIMIT: usize = 100;

const UNIT_MAX: usize = 32;
const NOTES_MAX: usize = 1_000;

/// Identifier of a recorded metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthMetricId(Uuid);

impl HealthMetricId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for HealthMetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricType {
    /// Blood glucose.
    BloodSugar,
    /// Blood pressure.
    BloodPressure,
    /// Body weight.
    Weight,
}

impl MetricType {
    /// camelCase wire and storage form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BloodSugar => "bloodSugar",
            Self::BloodPressure => "bloodPressure",
            Self::Weight => "weight",
        }
    }
}

/// Error returned when parsing an unknown metric type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric type: {0}")]
pub struct UnknownMetricType(pub String);

impl FromStr for MetricType {
    type Err = UnknownMetricType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bloodSugar" => Ok(Self::BloodSugar),
            "bloodPressure" => Ok(Self::BloodPressure),
            "weight" => Ok(Self::Weight),
            other => Err(UnknownMetricType(other.to_owned())),
        }
    }
}

/// Validation failures for a new reading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricValidationError {
    /// Value was NaN or infinite.
    #[error("value must be a finite number")]
    NonFiniteValue,
    /// Unit was blank once trimmed.
    #[error("unit must not be empty")]
    EmptyUnit,
    /// Unit was longer than allowed.
    #[error("unit must be at most {max} characters")]
    UnitTooLong {
        /// Maximum permitted characters.
        max: usize,
    },
    /// Notes were longer than allowed.
    #[error("notes must be at most {max} characters")]
    NotesTooLong {
        /// Maximum permitted characters.
        max: usize,
    },
}

/// A validated measurement that has not been stored yet.
///
/// # Examples
/// ```
/// use careline::domain::{MetricReading, MetricType};
///
/// let reading = MetricReading::try_new(MetricType::BloodSugar, 110.0, "mg/dL", Some("  ")).unwrap();
/// assert_eq!(reading.unit(), "mg/dL");
/// assert!(reading.notes().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    metric_type: MetricType,
    value: f64,
    unit: String,
    notes: Option<String>,
}

impl MetricReading {
    /// Validate the parts of a reading. Blank notes collapse to `None`.
    pub fn try_new(
        metric_type: MetricType,
        value: f64,
        unit: &str,
        notes: Option<&str>,
    ) -> Result<Self, MetricValidationError> {
        if !value.is_finite() {
            return Err(MetricValidationError::NonFiniteValue);
        }
        let trimmed_unit = unit.trim();
        if trimmed_unit.is_empty() {
            return Err(MetricValidationError::EmptyUnit);
        }
        if trimmed_unit.chars().count() > UNIT_MAX {
            return Err(MetricValidationError::UnitTooLong { max: UNIT_MAX });
        }
        let trimmed_notes = notes.map(str::trim).filter(|n| !n.is_empty());
        if trimmed_notes.is_some_and(|n| n.chars().count() > NOTES_MAX) {
            return Err(MetricValidationError::NotesTooLong { max: NOTES_MAX });
        }
        Ok(Self {
            metric_type,
            value,
            unit: trimmed_unit.to_owned(),
            notes: trimmed_notes.map(str::to_owned),
        })
    }

    /// Kind of measurement.
    #[must_use]
    pub const fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Measured value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Unit label.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Optional free-text notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Attach identity and time to produce a stored metric.
    #[must_use]
    pub fn into_metric(self, patient_id: UserId, timestamp: DateTime<Utc>) -> HealthMetric {
        HealthMetric {
            id: HealthMetricId::random(),
            patient_id,
            metric_type: self.metric_type,
            value: self.value,
            unit: self.unit,
            notes: self.notes,
            timestamp,
        }
    }
}

/// A stored health metric.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthMetric {
    /// Identifier.
    pub id: HealthMetricId,
    /// Patient the measurement belongs to.
    pub patient_id: UserId,
    /// Kind of measurement.
    pub metric_type: MetricType,
    /// Measured value.
    pub value: f64,
    /// Unit label.
    pub unit: String,
    /// Optional notes.
    pub notes: Option<String>,
    /// When the measurement was taken.
    pub timestamp: DateTime<Utc>,
}

/// Listing filter for a patient's metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricQuery {
    /// Restrict to one metric type.
    pub metric_type: Option<MetricType>,
    /// Maximum number of rows, newest first.
    pub limit: usize,
}

impl Default for MetricQuery {
    fn default() -> Self {
        Self {
            metric_type: None,
            limit: METRIC_LIST_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN, "mg/dL", MetricValidationError::NonFiniteValue)]
    #[case(f64::INFINITY, "kg", MetricValidationError::NonFiniteValue)]
    #[case(72.5, "  ", MetricValidationError::EmptyUnit)]
    fn rejects_invalid_readings(
        #[case] value: f64,
        #[case] unit: &str,
        #[case] expected: MetricValidationError,
    ) {
        let err = MetricReading::try_new(MetricType::Weight, value, unit, None)
            .expect_err("invalid reading");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn rejects_oversized_notes() {
        let notes = "n".repeat(NOTES_MAX + 1);
        let err = MetricReading::try_new(MetricType::Weight, 70.0, "kg", Some(&notes))
            .expect_err("notes too long");
        assert_eq!(err, MetricValidationError::NotesTooLong { max: NOTES_MAX });
    }

    #[rstest]
    #[case("bloodSugar", MetricType::BloodSugar)]
    #[case("bloodPressure", MetricType::BloodPressure)]
    #[case("weight", MetricType::Weight)]
    fn metric_type_wire_names(#[case] raw: &str, #[case] expected: MetricType) {
        assert_eq!(raw.parse::<MetricType>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
        let json = serde_json::to_value(expected).expect("serialise");
        assert_eq!(json, serde_json::Value::String(raw.to_owned()));
    }

    #[rstest]
    fn into_metric_keeps_reading_fields() {
        let patient = UserId::random();
        let now = Utc::now();
        let metric = MetricReading::try_new(MetricType::BloodSugar, 110.0, " mg/dL ", Some("fasting"))
            .expect("valid")
            .into_metric(patient, now);
        assert_eq!(metric.patient_id, patient);
        assert_eq!(metric.unit, "mg/dL");
        assert_eq!(metric.notes.as_deref(), Some("fasting"));
        assert_eq!(metric.timestamp, now);
    }

    #[rstest]
    fn default_query_caps_listing() {
        assert_eq!(MetricQuery::default().limit, METRIC_LIST_LIMIT);
    }
}
