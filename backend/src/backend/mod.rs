//! # Backend Module
//!
//! Contains all non-UI logic for the infant-care log.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: Event aggregation, highlights, charts, and the services
//! - **Storage**: Flat-file persistence of profiles and events
//! - **IO**: REST handlers that expose the services to the UI
//!
//! ## Architecture
//!
//! ```text
//! UI (external)
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (aggregation, services)
//!     ↓
//! Storage Layer (CSV + YAML files)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::backend::domain::{EventService, ProfileService};
use crate::backend::storage::csv::CsvConnection;
use crate::config::AppConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub event_service: EventService<CsvConnection>,
    pub profile_service: ProfileService<CsvConnection>,
}

impl AppState {
    pub fn new(connection: CsvConnection) -> Self {
        let connection = Arc::new(connection);
        let profile_service = ProfileService::new(connection.clone());
        let event_service = EventService::new(connection, profile_service.clone());

        Self {
            event_service,
            profile_service,
        }
    }
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage in {}", config.data_dir.display());
    let connection = CsvConnection::new(&config.data_dir)?;

    info!("Setting up application state");
    Ok(AppState::new(connection))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(io::health_check))
        .route(
            "/session",
            get(io::get_session).post(io::sign_in).delete(io::sign_out),
        )
        .route("/profile", get(io::get_profile).put(io::update_profile))
        .route("/events/:kind", get(io::list_events).post(io::create_event))
        .route(
            "/events/:kind/:id",
            get(io::get_event).patch(io::update_event).delete(io::delete_event),
        )
        .route("/highlights", get(io::get_highlights))
        .route("/charts/:kind", get(io::get_chart));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
