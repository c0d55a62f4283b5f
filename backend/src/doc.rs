//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` endpoint, the health probes, the request
//! and response DTOs, and the [`ErrorSchema`] mirror of the domain error. The
//! document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::accounts::{LoginRequest, RegisterRequest};
use crate::inbound::http::dto::{
    AuthResponse, MessageListEntry, MessageResponse, MetricResponse, ParticipantResponse,
    UserResponse,
};
use crate::inbound::http::messages::SendMessageBody;
use crate::inbound::http::patients::{PatientProfileBody, RecordMetricBody};
use crate::inbound::http::providers::ProviderProfileBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some(
                "Token returned by POST /api/auth/register or /api/auth/login.",
            ))
            .build();
        components.add_security_scheme("BearerToken", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Careline backend API",
        description = "Patient health metrics, care-team assignments, and patient/provider messaging."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::patients::list_metrics,
        crate::inbound::http::patients::record_metric,
        crate::inbound::http::patients::patient_profile,
        crate::inbound::http::patients::update_patient_profile,
        crate::inbound::http::providers::list_patients,
        crate::inbound::http::providers::assign_patient,
        crate::inbound::http::providers::unassign_patient,
        crate::inbound::http::providers::provider_profile,
        crate::inbound::http::providers::update_provider_profile,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::send_message,
        crate::inbound::http::messages::mark_read,
        crate::inbound::http::messages::delete_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        RecordMetricBody,
        MetricResponse,
        PatientProfileBody,
        ProviderProfileBody,
        SendMessageBody,
        MessageResponse,
        MessageListEntry,
        ParticipantResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and the current account"),
        (name = "patients", description = "Patient metrics and profiles"),
        (name = "providers", description = "Provider rosters and profiles"),
        (name = "messages", description = "Direct messages between assigned parties"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_has_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        for field in ["code", "message", "traceId", "details"] {
            assert_object_schema_has_field(error_schema, field);
        }
    }

    #[rstest]
    #[case("/api/auth/register")]
    #[case("/api/patients/{patientId}/metrics")]
    #[case("/api/providers/{providerId}/patients/{patientId}")]
    #[case("/api/messages/{messageId}/read")]
    #[case("/health/ready")]
    fn documents_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
