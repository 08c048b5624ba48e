//! # REST API for Daily Highlights

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::NaiveDate;
use log::info;
use serde::Deserialize;

use super::error_response;
use crate::backend::domain::commands::reports::HighlightsQuery;
use crate::backend::domain::highlights::format_highlights;
use crate::backend::AppState;
use shared::HighlightsResponse;

#[derive(Debug, Deserialize)]
pub struct HighlightsParams {
    /// YYYY-MM-DD; today when absent
    pub date: Option<NaiveDate>,
}

pub async fn get_highlights(
    State(state): State<AppState>,
    Query(params): Query<HighlightsParams>,
) -> impl IntoResponse {
    info!("GET /api/highlights - query: {:?}", params);

    match state
        .event_service
        .get_daily_highlights(HighlightsQuery { date: params.date })
        .await
    {
        Ok(highlights) => {
            let formatted = format_highlights(&highlights);
            (StatusCode::OK, Json(HighlightsResponse { highlights, formatted })).into_response()
        }
        Err(e) => error_response("build highlights", e),
    }
}
