//! # REST API Interface Layer
//!
//! HTTP endpoints under `/api`. Handlers translate between the `shared`
//! DTOs and the domain commands, log each request, and turn domain errors
//! into status codes:
//!
//! - validation failures answer `400` with the message
//! - a request that needs a signed-in profile answers `401`
//! - an unknown event id answers `404`
//! - anything else (storage failures) answers `500`

pub mod chart_apis;
pub mod event_apis;
pub mod health_apis;
pub mod highlights_apis;
pub mod mappers;
pub mod profile_apis;
pub mod session_apis;

pub use chart_apis::*;
pub use event_apis::*;
pub use health_apis::*;
pub use highlights_apis::*;
pub use profile_apis::*;
pub use session_apis::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use shared::ErrorResponse;

use crate::backend::domain::event_service::EventServiceError;
use crate::backend::domain::models::event::EventValidationError;
use crate::backend::domain::models::profile::ProfileValidationError;
use crate::backend::domain::profile_service::ProfileServiceError;

/// Pick the status code for a domain error
pub fn status_for_error(error: &anyhow::Error) -> StatusCode {
    if error.downcast_ref::<ProfileServiceError>().is_some() {
        return StatusCode::UNAUTHORIZED;
    }

    if let Some(service_error) = error.downcast_ref::<EventServiceError>() {
        return match service_error {
            EventServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            EventServiceError::NoChart(_) | EventServiceError::IncompleteRange => StatusCode::BAD_REQUEST,
        };
    }

    if error.downcast_ref::<EventValidationError>().is_some()
        || error.downcast_ref::<ProfileValidationError>().is_some()
    {
        return StatusCode::BAD_REQUEST;
    }

    StatusCode::INTERNAL_SERVER_ERROR
}

/// Log a failed request and build its JSON error body.
/// Internal errors answer with `action` only, not the underlying cause.
pub fn error_response(action: &str, error: anyhow::Error) -> Response {
    let status = status_for_error(&error);

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Failed to {}: {:#}", action, error);
        format!("Failed to {}", action)
    } else {
        warn!("Rejected request to {}: {}", action, error);
        error.to_string()
    };

    (status, Json(ErrorResponse { error: message })).into_response()
}
