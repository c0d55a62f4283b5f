//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts for both roles.
    ///
    /// Patient rows carry `date_of_birth`, the medical lists, and the
    /// `provider_id` assignment edge. Provider rows carry `specialization`.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        role -> Varchar,
        date_of_birth -> Nullable<Date>,
        conditions -> Array<Text>,
        allergies -> Array<Text>,
        medications -> Array<Text>,
        specialization -> Nullable<Varchar>,
        /// Assigned provider; the only stored side of the care relationship.
        provider_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Patient measurements.
    health_metrics (id) {
        id -> Uuid,
        patient_id -> Uuid,
        metric_type -> Varchar,
        value -> Float8,
        unit -> Varchar,
        notes -> Nullable<Text>,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Direct messages between an assigned patient and provider.
    messages (id) {
        id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        content -> Text,
        read -> Bool,
        sent_at -> Timestamptz,
    }
}

diesel::joinable!(health_metrics -> users (patient_id));

diesel::allow_tables_to_appear_in_same_query!(health_metrics, messages, users);
