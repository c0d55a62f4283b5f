//! Provider API handlers: the patient roster and the provider profile.
//!
//! ```text
//! GET /api/providers/{providerId}/patients
//! POST /api/providers/{providerId}/patients/{patientId}
//! DELETE /api/providers/{providerId}/patients/{patientId}
//! GET /api/providers/{providerId}/profile
//! PATCH /api/providers/{providerId}/profile {"specialization":"Cardiology"}
//! ```

use actix_web::{delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{ProviderProfileUpdate, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::dto::UserResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id, profile_update_error};

const PROVIDER_ID: FieldName = FieldName::new("providerId");
const PATIENT_ID: FieldName = FieldName::new("patientId");

/// Body for `PATCH /api/providers/{providerId}/profile`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProviderProfileBody {
    /// New display name.
    pub name: Option<String>,
    /// New specialty.
    pub specialization: Option<String>,
}

fn roster_ids(path: web::Path<(String, String)>) -> ApiResult<(UserId, UserId)> {
    let (provider, patient) = path.into_inner();
    Ok((
        parse_user_id(&provider, PROVIDER_ID)?,
        parse_user_id(&patient, PATIENT_ID)?,
    ))
}

/// List the calling provider's patients.
#[utoipa::path(
    get,
    path = "/api/providers/{providerId}/patients",
    params(("providerId" = String, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Assigned patients ordered by name", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Providers may only list their own roster", body = ErrorSchema)
    ),
    tags = ["providers"],
    operation_id = "listPatients"
)]
#[get("/providers/{providerId}/patients")]
pub async fn list_patients(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let provider_id = parse_user_id(&path.into_inner(), PROVIDER_ID)?;
    let patients = state
        .care_team_query
        .list_patients(caller.caller(), &provider_id)
        .await?;
    Ok(web::Json(patients.iter().map(UserResponse::from).collect()))
}

/// Assign a patient to the calling provider.
///
/// Idempotent; a patient assigned elsewhere moves to this provider.
#[utoipa::path(
    post,
    path = "/api/providers/{providerId}/patients/{patientId}",
    params(
        ("providerId" = String, Path, description = "Provider id"),
        ("patientId" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Patient as stored after assignment", body = UserResponse),
        (status = 400, description = "Target is not a patient", body = ErrorSchema),
        (status = 403, description = "Providers may only manage their own roster", body = ErrorSchema),
        (status = 404, description = "No such patient", body = ErrorSchema)
    ),
    tags = ["providers"],
    operation_id = "assignPatient"
)]
#[post("/providers/{providerId}/patients/{patientId}")]
pub async fn assign_patient(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<UserResponse>> {
    let (provider_id, patient_id) = roster_ids(path)?;
    let patient = state
        .care_team
        .assign_patient(caller.caller(), &provider_id, &patient_id)
        .await?;
    Ok(web::Json(UserResponse::from(patient)))
}

/// Remove a patient from the calling provider's roster.
#[utoipa::path(
    delete,
    path = "/api/providers/{providerId}/patients/{patientId}",
    params(
        ("providerId" = String, Path, description = "Provider id"),
        ("patientId" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Patient as stored after removal", body = UserResponse),
        (status = 403, description = "Providers may only manage their own roster", body = ErrorSchema),
        (status = 404, description = "No such patient", body = ErrorSchema)
    ),
    tags = ["providers"],
    operation_id = "unassignPatient"
)]
#[delete("/providers/{providerId}/patients/{patientId}")]
pub async fn unassign_patient(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<UserResponse>> {
    let (provider_id, patient_id) = roster_ids(path)?;
    let patient = state
        .care_team
        .unassign_patient(caller.caller(), &provider_id, &patient_id)
        .await?;
    Ok(web::Json(UserResponse::from(patient)))
}

/// Fetch a provider profile.
#[utoipa::path(
    get,
    path = "/api/providers/{providerId}/profile",
    params(("providerId" = String, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Provider profile", body = UserResponse),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such provider", body = ErrorSchema)
    ),
    tags = ["providers"],
    operation_id = "getProviderProfile"
)]
#[get("/providers/{providerId}/profile")]
pub async fn provider_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let provider_id = parse_user_id(&path.into_inner(), PROVIDER_ID)?;
    let user = state
        .profiles
        .provider_profile(caller.caller(), &provider_id)
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Edit the calling provider's own profile.
#[utoipa::path(
    patch,
    path = "/api/providers/{providerId}/profile",
    params(("providerId" = String, Path, description = "Provider id")),
    request_body = ProviderProfileBody,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Providers may only edit themselves", body = ErrorSchema)
    ),
    tags = ["providers"],
    operation_id = "updateProviderProfile"
)]
#[patch("/providers/{providerId}/profile")]
pub async fn update_provider_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<ProviderProfileBody>,
) -> ApiResult<web::Json<UserResponse>> {
    let provider_id = parse_user_id(&path.into_inner(), PROVIDER_ID)?;
    let ProviderProfileBody {
        name,
        specialization,
    } = payload.into_inner();
    let update = ProviderProfileUpdate::try_from_parts(name.as_deref(), specialization.as_deref())
        .map_err(|err| profile_update_error(&err))?;
    let user = state
        .profile_updates
        .update_provider_profile(caller.caller(), &provider_id, update)
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::domain::test_fixtures::{assigned_pair, patient, provider};
    use crate::inbound::http::test_utils::{StateBuilder, auth_header, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[actix_web::test]
    async fn roster_lists_patients() {
        let (alice, dr_bob) = assigned_pair();
        let mut builder = StateBuilder::default().signed_in(&dr_bob);
        let roster = vec![alice.clone()];
        builder
            .care_team_query
            .expect_list_patients()
            .returning(move |_, _| Ok(roster.clone()));
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/providers/{}/patients", dr_bob.id))
                .insert_header(auth_header(&dr_bob))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body[0]["name"], "Alice");
        assert_eq!(body[0]["providerId"], dr_bob.id.to_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn assign_passes_both_ids_to_the_service() {
        let dr_bob = provider("Dr Bob", &[]);
        let carol = patient("Carol", Some(dr_bob.id));
        let mut builder = StateBuilder::default().signed_in(&dr_bob);
        let (provider_id, patient_id) = (dr_bob.id, carol.id);
        let stored = carol.clone();
        builder
            .care_team
            .expect_assign_patient()
            .withf(move |_, provider, patient| *provider == provider_id && *patient == patient_id)
            .times(1)
            .returning(move |_, _, _| Ok(stored.clone()));
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/providers/{}/patients/{}", dr_bob.id, carol.id))
                .insert_header(auth_header(&dr_bob))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn unassign_rejects_malformed_patient_ids() {
        let dr_bob = provider("Dr Bob", &[]);
        let app =
            actix_test::init_service(test_app(StateBuilder::default().signed_in(&dr_bob).build()))
                .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/providers/{}/patients/42", dr_bob.id))
                .insert_header(auth_header(&dr_bob))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "patientId");
    }

    #[rstest]
    #[case(Error::not_found("patient not found"), StatusCode::NOT_FOUND)]
    #[case(Error::forbidden("not your roster"), StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn unassign_surfaces_service_errors(#[case] error: Error, #[case] expected: StatusCode) {
        let (alice, dr_bob) = assigned_pair();
        let mut builder = StateBuilder::default().signed_in(&dr_bob);
        builder
            .care_team
            .expect_unassign_patient()
            .returning(move |_, _, _| Err(error.clone()));
        let app = actix_test::init_service(test_app(builder.build())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/providers/{}/patients/{}", dr_bob.id, alice.id))
                .insert_header(auth_header(&dr_bob))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn profile_patch_validates_specialization() {
        let dr_bob = provider("Dr Bob", &[]);
        let app =
            actix_test::init_service(test_app(StateBuilder::default().signed_in(&dr_bob).build()))
                .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/providers/{}/profile", dr_bob.id))
                .insert_header(auth_header(&dr_bob))
                .set_json(json!({"specialization": "   "}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "specialization");
    }
}
