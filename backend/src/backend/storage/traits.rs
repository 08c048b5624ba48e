//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{EventField, EventKind};

use crate::backend::domain::models::event::CareEvent;
use crate::backend::domain::models::profile::{ActiveSession, ChildProfile};

/// Trait defining the interface for event storage operations
///
/// Every event kind is its own collection, scoped to the profile identified
/// by `profile_email`.
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Store a new event
    async fn store_event(&self, profile_email: &str, event: &CareEvent) -> Result<()>;

    /// Retrieve a specific event by ID
    async fn get_event(&self, profile_email: &str, kind: EventKind, event_id: &str) -> Result<Option<CareEvent>>;

    /// List every event of a kind, most recent timestamp first
    async fn list_events(&self, profile_email: &str, kind: EventKind) -> Result<Vec<CareEvent>>;

    /// List events whose `field` lies between `start` and `end` (both
    /// inclusive), most recent first
    async fn list_events_in_range(
        &self,
        profile_email: &str,
        kind: EventKind,
        field: EventField,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CareEvent>>;

    /// Replace the stored event with the same kind and ID
    /// Returns true if the event was found and updated, false otherwise
    async fn update_event(&self, profile_email: &str, event: &CareEvent) -> Result<bool>;

    /// Delete a single event
    /// Returns true if the event was found and deleted, false otherwise
    async fn delete_event(&self, profile_email: &str, kind: EventKind, event_id: &str) -> Result<bool>;
}

/// Trait defining the interface for profile storage operations
#[async_trait]
pub trait ProfileStorage: Send + Sync {
    /// Store a new profile
    async fn store_profile(&self, profile: &ChildProfile) -> Result<()>;

    /// Retrieve the profile owned by an email address
    async fn get_profile_by_email(&self, email: &str) -> Result<Option<ChildProfile>>;

    /// Update an existing profile
    async fn update_profile(&self, profile: &ChildProfile) -> Result<()>;

    /// Get the signed-in session, if any
    async fn get_active_session(&self) -> Result<Option<ActiveSession>>;

    /// Mark a profile as signed in
    async fn set_active_session(&self, session: &ActiveSession) -> Result<()>;

    /// Sign out
    async fn clear_active_session(&self) -> Result<()>;
}

/// Connection trait that can create repositories
pub trait Connection: Send + Sync + Clone {
    /// The type of EventStorage this connection creates
    type EventRepository: EventStorage + Clone;

    /// The type of ProfileStorage this connection creates
    type ProfileRepository: ProfileStorage + Clone;

    /// Create a new event repository for this connection
    fn create_event_repository(&self) -> Self::EventRepository;

    /// Create a new profile repository for this connection
    fn create_profile_repository(&self) -> Self::ProfileRepository;
}
