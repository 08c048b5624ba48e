//! # REST API for the Session
//!
//! Sign in, sign out, and read the signed-in user.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use super::error_response;
use super::mappers::profile_mapper::ProfileMapper;
use crate::backend::domain::commands::profiles::SignInCommand;
use crate::backend::AppState;
use shared::{ErrorResponse, SessionResponse, SignInRequest};

/// Get the signed-in user
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/session");

    match state.profile_service.current_user().await {
        Ok(Some(user)) => (StatusCode::OK, Json(ProfileMapper::user_to_dto(user))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not signed in".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response("read the session", e),
    }
}

/// Sign in, creating the profile on first use
pub async fn sign_in(State(state): State<AppState>, Json(request): Json<SignInRequest>) -> impl IntoResponse {
    info!("POST /api/session - email: {}", request.email);

    let command = SignInCommand {
        email: request.email,
        display_name: request.display_name,
    };

    match state.profile_service.sign_in(command).await {
        Ok((user, profile)) => {
            let response = SessionResponse {
                user: ProfileMapper::user_to_dto(user),
                profile: ProfileMapper::to_dto(profile),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("sign in", e),
    }
}

pub async fn sign_out(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/session");

    match state.profile_service.sign_out().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("sign out", e),
    }
}
