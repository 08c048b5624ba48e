//! # REST API for Care Events
//!
//! One collection per event kind: `/api/events/:kind` and
//! `/api/events/:kind/:id`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use super::error_response;
use super::mappers::event_mapper::EventMapper;
use crate::backend::domain::commands::events::{
    CreateEventCommand, DeleteEventCommand, EventListQuery, UpdateEventCommand,
};
use crate::backend::AppState;
use shared::{CreateEventRequest, DeleteEventResponse, EventKind, EventListRequest, EventListResponse};

/// List every event of a kind, or those between `start` and `end`
pub async fn list_events(
    State(state): State<AppState>,
    Path(kind): Path<EventKind>,
    Query(request): Query<EventListRequest>,
) -> impl IntoResponse {
    info!("GET /api/events/{} - query: {:?}", kind, request);

    let query = EventListQuery {
        kind,
        start: request.start,
        end: request.end,
        field: request.field.unwrap_or_default(),
    };

    match state.event_service.list_events(query).await {
        Ok(events) => {
            let response = EventListResponse {
                kind,
                events: EventMapper::to_dtos(events),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("list events", e),
    }
}

pub async fn get_event(
    State(state): State<AppState>,
    Path((kind, event_id)): Path<(EventKind, String)>,
) -> impl IntoResponse {
    info!("GET /api/events/{}/{}", kind, event_id);

    match state.event_service.get_event(kind, &event_id).await {
        Ok(event) => (StatusCode::OK, Json(EventMapper::to_dto(event))).into_response(),
        Err(e) => error_response("load the event", e),
    }
}

/// Create a new event; the body's `kind` must match the path
pub async fn create_event(
    State(state): State<AppState>,
    Path(kind): Path<EventKind>,
    Json(request): Json<CreateEventRequest>,
) -> impl IntoResponse {
    info!("POST /api/events/{} - request: {:?}", kind, request);

    match state.event_service.create_event(CreateEventCommand { kind, request }).await {
        Ok(result) => (StatusCode::CREATED, Json(EventMapper::to_response(result))).into_response(),
        Err(e) => error_response("create the event", e),
    }
}

/// Merge a partial update into an event
pub async fn update_event(
    State(state): State<AppState>,
    Path((kind, event_id)): Path<(EventKind, String)>,
    Json(patch): Json<serde_json::Value>,
) -> impl IntoResponse {
    info!("PATCH /api/events/{}/{} - patch: {}", kind, event_id, patch);

    let command = UpdateEventCommand { kind, event_id, patch };

    match state.event_service.update_event(command).await {
        Ok(result) => (StatusCode::OK, Json(EventMapper::to_response(result))).into_response(),
        Err(e) => error_response("update the event", e),
    }
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path((kind, event_id)): Path<(EventKind, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/events/{}/{}", kind, event_id);

    match state.event_service.delete_event(DeleteEventCommand { kind, event_id }).await {
        Ok(result) => {
            let response = DeleteEventResponse {
                id: result.event_id,
                success_message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete the event", e),
    }
}
