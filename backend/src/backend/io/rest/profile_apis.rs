//! # REST API for the Active Profile

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use super::error_response;
use super::mappers::profile_mapper::ProfileMapper;
use crate::backend::AppState;
use shared::{ProfileResponse, UpdateProfileRequest};

pub async fn get_profile(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/profile");

    match state.profile_service.require_active_profile().await {
        Ok(profile) => (StatusCode::OK, Json(ProfileMapper::to_dto(profile))).into_response(),
        Err(e) => error_response("load the profile", e),
    }
}

/// Partially update the active profile
pub async fn update_profile(
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    info!("PUT /api/profile - request: {:?}", request);

    let command = ProfileMapper::to_update_command(request);

    match state.profile_service.update_profile(command).await {
        Ok(profile) => {
            let response = ProfileResponse {
                profile: ProfileMapper::to_dto(profile),
                success_message: "Profile updated successfully".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("update the profile", e),
    }
}
