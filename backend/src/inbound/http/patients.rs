//! Patient API handlers: health metrics and the patient profile.
//!
//! ```text
//! GET /api/patients/{patientId}/metrics?type=bloodSugar
//! POST /api/patients/{patientId}/metrics {"type":"bloodSugar","value":110,"unit":"mg/dL"}
//! GET /api/patients/{patientId}/profile
//! PATCH /api/patients/{patientId}/profile {"medications":["metformin"]}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::access_policy::can_record_metric;
use crate::domain::ports::RecordMetricRequest;
use crate::domain::{
    Error, MetricReading, MetricType, MetricValidationError, PatientProfileDraft,
    PatientProfileUpdate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::dto::{MetricResponse, UserResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, parse_user_id, profile_update_error,
};

const PATIENT_ID: FieldName = FieldName::new("patientId");

/// Query string for `GET /api/patients/{patientId}/metrics`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MetricsQuery {
    /// Restrict to one metric type.
    #[serde(rename = "type")]
    #[param(example = "bloodSugar")]
    pub metric_type: Option<String>,
}

/// Body for `POST /api/patients/{patientId}/metrics`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordMetricBody {
    /// `bloodSugar`, `bloodPressure`, or `weight`.
    #[serde(rename = "type")]
    #[schema(example = "bloodSugar")]
    pub metric_type: String,
    /// Measured value.
    pub value: f64,
    /// Unit of `value`.
    #[schema(example = "mg/dL")]
    pub unit: String,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// When the reading was taken; defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body for `PATCH /api/patients/{patientId}/profile`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileBody {
    /// New display name.
    pub name: Option<String>,
    /// New date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Replacement condition list.
    pub conditions: Option<Vec<String>>,
    /// Replacement allergy list.
    pub allergies: Option<Vec<String>>,
    /// Replacement medication list.
    pub medications: Option<Vec<String>>,
}

impl From<PatientProfileBody> for PatientProfileDraft {
    fn from(body: PatientProfileBody) -> Self {
        Self {
            name: body.name,
            date_of_birth: body.date_of_birth,
            conditions: body.conditions,
            allergies: body.allergies,
            medications: body.medications,
        }
    }
}

fn parse_metric_type(raw: &str) -> Result<MetricType, Error> {
    MetricType::from_str(raw)
        .map_err(|err| field_error("type", "unknown_metric_type", err.to_string()))
}

fn map_metric_error(err: &MetricValidationError) -> Error {
    let (field, code) = match err {
        MetricValidationError::NonFiniteValue => ("value", "not_finite"),
        MetricValidationError::EmptyUnit => ("unit", "empty"),
        MetricValidationError::UnitTooLong { .. } => ("unit", "too_long"),
        MetricValidationError::NotesTooLong { .. } => ("notes", "too_long"),
    };
    field_error(field, code, err.to_string())
}

fn reading_from(body: &RecordMetricBody) -> Result<MetricReading, Error> {
    let metric_type = parse_metric_type(&body.metric_type)?;
    MetricReading::try_new(metric_type, body.value, &body.unit, body.notes.as_deref())
        .map_err(|err| map_metric_error(&err))
}

/// List a patient's metrics, newest first.
#[utoipa::path(
    get,
    path = "/api/patients/{patientId}/metrics",
    params(("patientId" = String, Path, description = "Patient id"), MetricsQuery),
    responses(
        (status = 200, description = "Up to 100 metrics, newest first", body = [MetricResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller may not view this patient", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "listMetrics"
)]
#[get("/patients/{patientId}/metrics")]
pub async fn list_metrics(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    query: web::Query<MetricsQuery>,
) -> ApiResult<web::Json<Vec<MetricResponse>>> {
    let patient_id = parse_user_id(&path.into_inner(), PATIENT_ID)?;
    let metric_type = query
        .into_inner()
        .metric_type
        .as_deref()
        .map(parse_metric_type)
        .transpose()?;
    let metrics = state
        .metrics_query
        .list_metrics(caller.caller(), &patient_id, metric_type)
        .await?;
    Ok(web::Json(metrics.into_iter().map(MetricResponse::from).collect()))
}

/// Record a metric for the calling patient.
///
/// The caller is checked against the path before the body is validated, so a
/// provider posting to a patient's metrics always receives 403.
#[utoipa::path(
    post,
    path = "/api/patients/{patientId}/metrics",
    params(("patientId" = String, Path, description = "Patient id")),
    request_body = RecordMetricBody,
    responses(
        (status = 201, description = "Metric recorded", body = MetricResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only the patient may record metrics", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "recordMetric"
)]
#[post("/patients/{patientId}/metrics")]
pub async fn record_metric(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<RecordMetricBody>,
) -> ApiResult<HttpResponse> {
    let patient_id = parse_user_id(&path.into_inner(), PATIENT_ID)?;
    can_record_metric(caller.caller(), &patient_id)
        .require("patients may only record their own metrics")?;
    let body = payload.into_inner();
    let reading = reading_from(&body)?;
    let metric = state
        .metrics
        .record_metric(
            caller.caller(),
            RecordMetricRequest {
                patient_id,
                reading,
                taken_at: body.timestamp,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(MetricResponse::from(metric)))
}

/// Fetch a patient profile.
#[utoipa::path(
    get,
    path = "/api/patients/{patientId}/profile",
    params(("patientId" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such patient", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "getPatientProfile"
)]
#[get("/patients/{patientId}/profile")]
pub async fn patient_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let patient_id = parse_user_id(&path.into_inner(), PATIENT_ID)?;
    let user = state
        .profiles
        .patient_profile(caller.caller(), &patient_id)
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Edit the calling patient's own profile.
#[utoipa::path(
    patch,
    path = "/api/patients/{patientId}/profile",
    params(("patientId" = String, Path, description = "Patient id")),
    request_body = PatientProfileBody,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Patients may only edit themselves", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "updatePatientProfile"
)]
#[patch("/patients/{patientId}/profile")]
pub async fn update_patient_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<PatientProfileBody>,
) -> ApiResult<web::Json<UserResponse>> {
    let patient_id = parse_user_id(&path.into_inner(), PATIENT_ID)?;
    let update = PatientProfileUpdate::try_from_draft(payload.into_inner().into())
        .map_err(|err| profile_update_error(&err))?;
    let user = state
        .profile_updates
        .update_patient_profile(caller.caller(), &patient_id, update)
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{assigned_pair, fixture_timestamp, provider};
    use crate::domain::{HealthMetric, UserId};
    use crate::inbound::http::test_utils::{StateBuilder, auth_header, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn sugar(patient_id: UserId) -> HealthMetric {
        MetricReading::try_new(MetricType::BloodSugar, 110.0, "mg/dL", None)
            .expect("valid reading")
            .into_metric(patient_id, fixture_timestamp())
    }

    #[rstest]
    #[actix_web::test]
    async fn list_metrics_forwards_the_type_filter() {
        let (alice, dr_bob) = assigned_pair();
        let mut builder = StateBuilder::default().signed_in(&dr_bob);
        let alice_id = alice.id;
        builder
            .metrics_query
            .expect_list_metrics()
            .withf(move |_, patient, filter| {
                *patient == alice_id && *filter == Some(MetricType::BloodSugar)
            })
            .returning(move |_, _, _| Ok(vec![sugar(alice_id)]));
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/patients/{}/metrics?type=bloodSugar", alice.id))
                .insert_header(auth_header(&dr_bob))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body[0]["type"], "bloodSugar");
        assert_eq!(body[0]["patientId"], alice.id.to_string());
    }

    #[rstest]
    #[case::bad_id("/api/patients/not-a-uuid/metrics", "patientId")]
    #[case::bad_type(
        "/api/patients/3fa85f64-5717-4562-b3fc-2c963f66afa6/metrics?type=heartRate",
        "type"
    )]
    #[actix_web::test]
    async fn list_metrics_rejects_bad_input(#[case] uri: &str, #[case] field: &str) {
        let dr_eve = provider("Dr Eve", &[]);
        let app = actix_test::init_service(test_app(
            StateBuilder::default().signed_in(&dr_eve).build(),
        ))
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(uri)
                .insert_header(auth_header(&dr_eve))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn record_metric_returns_201() {
        let (alice, _) = assigned_pair();
        let mut builder = StateBuilder::default().signed_in(&alice);
        builder
            .metrics
            .expect_record_metric()
            .withf(|_, request| {
                request.reading.metric_type() == MetricType::Weight
                    && request.reading.unit() == "kg"
                    && request.taken_at.is_none()
            })
            .returning(|_, request| {
                Ok(request
                    .reading
                    .into_metric(request.patient_id, fixture_timestamp()))
            });
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/patients/{}/metrics", alice.id))
                .insert_header(auth_header(&alice))
                .set_json(json!({"type": "weight", "value": 72.5, "unit": " kg "}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["value"], 72.5);
        assert!(body.get("notes").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn record_metric_validates_the_unit() {
        let (alice, _) = assigned_pair();
        let app =
            actix_test::init_service(test_app(StateBuilder::default().signed_in(&alice).build()))
                .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/patients/{}/metrics", alice.id))
                .insert_header(auth_header(&alice))
                .set_json(json!({"type": "weight", "value": 72.5, "unit": "  "}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"], json!({"field": "unit", "code": "empty"}));
    }

    #[rstest]
    #[case::unknown_type(json!({"type": "heartRate", "value": 72.0, "unit": "bpm"}))]
    #[case::blank_unit(json!({"type": "weight", "value": 72.5, "unit": " "}))]
    #[actix_web::test]
    async fn providers_are_denied_before_the_body_is_validated(#[case] payload: Value) {
        let (alice, dr_bob) = assigned_pair();
        let mut builder = StateBuilder::default().signed_in(&dr_bob);
        builder.metrics.expect_record_metric().never();
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/patients/{}/metrics", alice.id))
                .insert_header(auth_header(&dr_bob))
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "forbidden");
    }

    #[rstest]
    #[actix_web::test]
    async fn policy_denials_surface_as_403() {
        let (alice, _) = assigned_pair();
        let dr_eve = provider("Dr Eve", &[]);
        let mut builder = StateBuilder::default().signed_in(&dr_eve);
        builder
            .metrics_query
            .expect_list_metrics()
            .returning(|_, _, _| Err(Error::forbidden("not your patient")));
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/patients/{}/metrics", alice.id))
                .insert_header(auth_header(&dr_eve))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn empty_profile_patch_is_rejected_before_the_service() {
        let (alice, _) = assigned_pair();
        let app =
            actix_test::init_service(test_app(StateBuilder::default().signed_in(&alice).build()))
                .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/patients/{}/profile", alice.id))
                .insert_header(auth_header(&alice))
                .set_json(json!({}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn profile_patch_forwards_the_validated_update() {
        let (alice, _) = assigned_pair();
        let mut builder = StateBuilder::default().signed_in(&alice);
        let updated = alice.clone();
        builder
            .profile_updates
            .expect_update_patient_profile()
            .withf(|_, _, update| update.medications == Some(vec!["metformin".to_owned()]))
            .returning(move |_, _, _| Ok(updated.clone()));
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/patients/{}/profile", alice.id))
                .insert_header(auth_header(&alice))
                .set_json(json!({"medications": [" metformin "]}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
