//! Event service: CRUD for care events plus the derived views (daily
//! highlights and trend charts) built from them.
//!
//! Every operation is scoped to the active profile. Day and period bounds
//! follow the server's local time zone.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use log::{info, warn};
use shared::{DailyHighlights, EventField, EventKind, Growth, GrowthPoint, PeriodUnit, SeriesPoint};
use std::sync::Arc;

use crate::backend::domain::chart_series::{build_growth_series, build_kind_series, local_date_key};
use crate::backend::domain::commands::events::{
    CreateEventCommand, DeleteEventCommand, DeleteEventResult, EventListQuery, EventResult,
    UpdateEventCommand,
};
use crate::backend::domain::commands::reports::{ChartQuery, HighlightsQuery};
use crate::backend::domain::date_window::{day_bounds, period_bounds, TimeWindow};
use crate::backend::domain::highlights::{build_daily_highlights, AggregationContext};
use crate::backend::domain::models::event::{CareEvent, EventValidationError};
use crate::backend::domain::profile_service::ProfileService;
use crate::backend::storage::{Connection, EventStorage};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EventServiceError {
    #[error("No {kind} event with id {event_id}")]
    NotFound { kind: EventKind, event_id: String },
    #[error("There is no trend chart for {0} events")]
    NoChart(EventKind),
    #[error("Both start and end are needed for a range query")]
    IncompleteRange,
}

#[derive(Clone)]
pub struct EventService<C: Connection> {
    event_repository: C::EventRepository,
    profile_service: ProfileService<C>,
}

impl<C: Connection> EventService<C> {
    pub fn new(connection: Arc<C>, profile_service: ProfileService<C>) -> Self {
        let event_repository = connection.create_event_repository();
        Self {
            event_repository,
            profile_service,
        }
    }

    /// Validate and store a new event
    pub async fn create_event(&self, command: CreateEventCommand) -> Result<EventResult> {
        let profile = self.profile_service.require_active_profile().await?;

        let event = CareEvent::from_request(command.request, CareEvent::generate_id(), Utc::now());
        if event.kind() != command.kind {
            return Err(EventValidationError::KindMismatch {
                expected: command.kind,
                found: event.kind(),
            }
            .into());
        }
        event.validate()?;

        self.event_repository.store_event(&profile.email, &event).await?;
        info!("Created {} event {}", event.kind(), event.id());

        Ok(EventResult {
            success_message: format!("{} event saved", capitalize(event.kind().as_str())),
            event,
        })
    }

    /// All events of a kind, or only those inside an inclusive range
    pub async fn list_events(&self, query: EventListQuery) -> Result<Vec<CareEvent>> {
        let profile = self.profile_service.require_active_profile().await?;

        match (query.start, query.end) {
            (Some(start), Some(end)) => {
                self.event_repository
                    .list_events_in_range(&profile.email, query.kind, query.field, start, end)
                    .await
            }
            (None, None) => self.event_repository.list_events(&profile.email, query.kind).await,
            _ => Err(EventServiceError::IncompleteRange.into()),
        }
    }

    pub async fn get_event(&self, kind: EventKind, event_id: &str) -> Result<CareEvent> {
        let profile = self.profile_service.require_active_profile().await?;

        self.event_repository
            .get_event(&profile.email, kind, event_id)
            .await?
            .ok_or_else(|| not_found(kind, event_id))
    }

    /// Merge a partial update into a stored event and re-validate it
    pub async fn update_event(&self, command: UpdateEventCommand) -> Result<EventResult> {
        let profile = self.profile_service.require_active_profile().await?;

        let existing = self
            .event_repository
            .get_event(&profile.email, command.kind, &command.event_id)
            .await?
            .ok_or_else(|| not_found(command.kind, &command.event_id))?;

        let updated = existing.merge_patch(&command.patch)?;

        if !self.event_repository.update_event(&profile.email, &updated).await? {
            return Err(not_found(command.kind, &command.event_id));
        }
        info!("Updated {} event {}", command.kind, command.event_id);

        Ok(EventResult {
            success_message: format!("{} event updated", capitalize(command.kind.as_str())),
            event: updated,
        })
    }

    pub async fn delete_event(&self, command: DeleteEventCommand) -> Result<DeleteEventResult> {
        let profile = self.profile_service.require_active_profile().await?;

        if !self
            .event_repository
            .delete_event(&profile.email, command.kind, &command.event_id)
            .await?
        {
            warn!("Delete requested for missing {} event {}", command.kind, command.event_id);
            return Err(not_found(command.kind, &command.event_id));
        }
        info!("Deleted {} event {}", command.kind, command.event_id);

        Ok(DeleteEventResult {
            success_message: format!("{} event deleted", capitalize(command.kind.as_str())),
            event_id: command.event_id,
        })
    }

    /// Highlights for one local calendar day, today by default
    pub async fn get_daily_highlights(&self, query: HighlightsQuery) -> Result<DailyHighlights> {
        let date = query.date.unwrap_or_else(|| Local::now().date_naive());
        self.daily_highlights_in(date, &Local).await
    }

    /// Highlights for `date` as a calendar day in `tz`
    pub async fn daily_highlights_in<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Result<DailyHighlights> {
        let profile = self.profile_service.require_active_profile().await?;
        let window = day_bounds(&midday(date, tz)?);

        let mut events = Vec::new();
        for kind in EventKind::ALL {
            let mut day_events = self
                .event_repository
                .list_events_in_range(&profile.email, kind, EventField::Timestamp, window.start, window.end)
                .await?;
            events.append(&mut day_events);
        }

        info!("Building highlights for {} from {} events", date, events.len());
        let context = AggregationContext::new(profile, window);
        Ok(build_daily_highlights(&context, &events))
    }

    /// Additive trend series for a kind over the period ending today
    pub async fn get_chart_series(&self, query: ChartQuery) -> Result<(TimeWindow, Vec<SeriesPoint>)> {
        self.chart_series_at(query, &Local::now()).await
    }

    pub async fn chart_series_at<Tz: TimeZone>(
        &self,
        query: ChartQuery,
        now: &DateTime<Tz>,
    ) -> Result<(TimeWindow, Vec<SeriesPoint>)> {
        let profile = self.profile_service.require_active_profile().await?;
        let window = period_bounds(now, query.amount, query.unit);

        // Sleep is charted on the day it started
        let field = match query.kind {
            EventKind::Sleep => EventField::Start,
            _ => EventField::Timestamp,
        };
        let events = self
            .event_repository
            .list_events_in_range(&profile.email, query.kind, field, window.start, window.end)
            .await?;

        let points = build_kind_series(query.kind, &events, &now.timezone())
            .ok_or(EventServiceError::NoChart(query.kind))?;

        info!("Built {} chart with {} points", query.kind, points.len());
        Ok((window, points))
    }

    /// Weight and height samples over the period ending today
    pub async fn get_growth_series(&self, amount: u32, unit: PeriodUnit) -> Result<(TimeWindow, Vec<GrowthPoint>)> {
        self.growth_series_at(amount, unit, &Local::now()).await
    }

    pub async fn growth_series_at<Tz: TimeZone>(
        &self,
        amount: u32,
        unit: PeriodUnit,
        now: &DateTime<Tz>,
    ) -> Result<(TimeWindow, Vec<GrowthPoint>)> {
        let profile = self.profile_service.require_active_profile().await?;
        let window = period_bounds(now, amount, unit);

        let samples: Vec<Growth> = self
            .event_repository
            .list_events_in_range(&profile.email, EventKind::Growth, EventField::Timestamp, window.start, window.end)
            .await?
            .into_iter()
            .filter_map(|e| match e {
                CareEvent::Growth(g) => Some(g),
                _ => None,
            })
            .collect();

        let tz = now.timezone();
        let points = build_growth_series(&samples, |g| local_date_key(&g.timestamp, &tz));
        Ok((window, points))
    }
}

fn not_found(kind: EventKind, event_id: &str) -> anyhow::Error {
    EventServiceError::NotFound {
        kind,
        event_id: event_id.to_string(),
    }
    .into()
}

/// Noon on `date` in `tz`; always a valid wall-clock time
fn midday<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).ok_or_else(|| anyhow!("Invalid time of day"))?;
    tz.from_local_datetime(&date.and_time(noon))
        .earliest()
        .ok_or_else(|| anyhow!("{} has no midday in this time zone", date))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
