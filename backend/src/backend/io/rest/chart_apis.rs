//! # REST API for Trend Charts
//!
//! `/api/charts/:kind` answers additive daily series for breast, bottle,
//! pump, changing and sleep events, and weight/height points for growth.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::info;

use super::error_response;
use crate::backend::domain::commands::reports::{ChartQuery, DEFAULT_CHART_AMOUNT};
use crate::backend::AppState;
use shared::{ChartRequest, ChartSeriesResponse, EventKind, GrowthChartResponse};

pub async fn get_chart(
    State(state): State<AppState>,
    Path(kind): Path<EventKind>,
    Query(request): Query<ChartRequest>,
) -> Response {
    info!("GET /api/charts/{} - query: {:?}", kind, request);

    let amount = request.amount.unwrap_or(DEFAULT_CHART_AMOUNT);
    let unit = request.unit.unwrap_or_default();

    if kind == EventKind::Growth {
        return match state.event_service.get_growth_series(amount, unit).await {
            Ok((window, points)) => {
                let response = GrowthChartResponse {
                    window_start: window.start,
                    window_end: window.end,
                    points,
                };
                (StatusCode::OK, Json(response)).into_response()
            }
            Err(e) => error_response("build the growth chart", e),
        };
    }

    match state.event_service.get_chart_series(ChartQuery { kind, amount, unit }).await {
        Ok((window, points)) => {
            let response = ChartSeriesResponse {
                kind,
                window_start: window.start,
                window_end: window.end,
                points,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("build the chart", e),
    }
}
