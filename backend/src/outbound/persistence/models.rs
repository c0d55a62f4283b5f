//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer; repositories convert them
//! into validated domain values.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{health_metrics, messages, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub date_of_birth: Option<NaiveDate>,
    pub conditions: Vec<String>,
    pub allergies: Vec<String>,
    pub medications: Vec<String>,
    pub specialization: Option<String>,
    pub provider_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insertable `users` record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub date_of_birth: Option<NaiveDate>,
    pub specialization: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Partial patient edit. `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct PatientProfileChangeset<'a> {
    pub name: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub conditions: Option<&'a [String]>,
    pub allergies: Option<&'a [String]>,
    pub medications: Option<&'a [String]>,
}

/// Partial provider edit. `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ProviderProfileChangeset<'a> {
    pub name: Option<&'a str>,
    pub specialization: Option<&'a str>,
}

/// Row read from `health_metrics`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = health_metrics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HealthMetricRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable `health_metrics` record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = health_metrics)]
pub(crate) struct NewHealthMetricRow<'a> {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub metric_type: &'a str,
    pub value: f64,
    pub unit: &'a str,
    pub notes: Option<&'a str>,
    pub recorded_at: DateTime<Utc>,
}

/// Row read from `messages`; also used for inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub read: bool,
    pub sent_at: DateTime<Utc>,
}
