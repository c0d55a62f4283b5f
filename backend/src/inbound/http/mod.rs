//! HTTP inbound adapter exposing the REST API under `/api`.

pub mod accounts;
pub mod auth;
pub mod dto;
pub mod error;
pub mod health;
pub mod messages;
pub mod patients;
pub mod providers;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// JSON extractor configuration reporting body errors in the API envelope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    })
}

/// Mount every `/api` route.
///
/// Handlers read [`state::HttpState`] from app data, so callers register it
/// on the [`actix_web::App`] before configuring.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .service(accounts::register)
            .service(accounts::login)
            .service(accounts::current_user)
            .service(patients::list_metrics)
            .service(patients::record_metric)
            .service(patients::patient_profile)
            .service(patients::update_patient_profile)
            .service(providers::list_patients)
            .service(providers::assign_patient)
            .service(providers::unassign_patient)
            .service(providers::provider_profile)
            .service(providers::update_provider_profile)
            .service(messages::list_messages)
            .service(messages::send_message)
            .service(messages::mark_read)
            .service(messages::delete_message),
    );
}
