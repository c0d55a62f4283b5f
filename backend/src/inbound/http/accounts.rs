//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Alice","email":"alice@example.com",...}
//! POST /api/auth/login {"email":"alice@example.com","password":"..."}
//! GET /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Registration, RegistrationDraft,
    RegistrationValidationError, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::dto::{AuthResponse, UserResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Registration body for `POST /api/auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// At least eight characters.
    pub password: String,
    /// `patient` (default) or `provider`.
    #[schema(value_type = Option<String>, example = "patient")]
    pub role: Option<Role>,
    /// Required for patients, `YYYY-MM-DD`.
    pub date_of_birth: Option<NaiveDate>,
    /// Required for providers.
    pub specialization: Option<String>,
    /// Consent to data processing; must be `true`.
    #[serde(default)]
    pub consent: bool,
}

impl RegisterRequest {
    fn draft(&self) -> RegistrationDraft<'_> {
        RegistrationDraft {
            name: &self.name,
            email: &self.email,
            password: &self.password,
            role: self.role,
            date_of_birth: self.date_of_birth,
            specialization: self.specialization.as_deref(),
            consent: self.consent,
        }
    }
}

/// Login body for `POST /api/auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

fn map_registration_error(err: &RegistrationValidationError) -> Error {
    let code = match err {
        RegistrationValidationError::ConsentRequired => "consent_required",
        RegistrationValidationError::PasswordTooShort { .. } => "password_too_short",
        RegistrationValidationError::MissingDateOfBirth
        | RegistrationValidationError::MissingSpecialization => "missing_field",
        RegistrationValidationError::DateOfBirthInFuture => "in_future",
        RegistrationValidationError::User(_) => "invalid_value",
    };
    field_error(err.field(), code, err.to_string())
}

fn map_login_error(err: &LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => field_error("email", "invalid_email", err.to_string()),
        LoginValidationError::EmptyPassword => {
            field_error("password", "empty_password", err.to_string())
        }
    }
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let today = Utc::now().date_naive();
    let registration = Registration::try_from_draft(&request.draft(), today)
        .map_err(|err| map_registration_error(&err))?;
    let session = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(|err| map_login_error(&err))?;
    let session = state.accounts.login(credentials).await?;
    Ok(web::Json(AuthResponse::from(session)))
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.profiles.current_user(caller.caller()).await?;
    Ok(web::Json(UserResponse::from(user)))
}
