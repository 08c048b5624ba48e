//! Daily Highlights: every reducer composed over one window of events.
//!
//! The result is a derived view. Nothing here is cached; callers rebuild it
//! whenever the underlying events change.

use shared::{DailyHighlights, FormattedHighlights, WeightDirection};

use super::date_window::TimeWindow;
use super::models::event::CareEvent;
use super::models::profile::ChildProfile;
use super::reducers;
use super::units::{format_minutes_duration, format_pounds_ounces};

/// Explicit inputs for an aggregation call: whose events, and over which window
#[derive(Debug, Clone)]
pub struct AggregationContext {
    pub profile: ChildProfile,
    pub window: TimeWindow,
}

impl AggregationContext {
    pub fn new(profile: ChildProfile, window: TimeWindow) -> Self {
        Self { profile, window }
    }
}

/// Partition `events` by kind and run each reducer over its share.
/// Events whose timestamp falls outside the context window are ignored.
pub fn build_daily_highlights(context: &AggregationContext, events: &[CareEvent]) -> DailyHighlights {
    let mut breast = Vec::new();
    let mut bottle = Vec::new();
    let mut pumping = Vec::new();
    let mut changing = Vec::new();
    let mut growth = Vec::new();
    let mut sleep = Vec::new();
    let mut notes = Vec::new();

    for event in events.iter().filter(|e| context.window.contains(&e.timestamp())) {
        match event {
            CareEvent::Breast(e) => breast.push(e.clone()),
            CareEvent::Bottle(e) => bottle.push(e.clone()),
            CareEvent::Pump(e) => pumping.push(e.clone()),
            CareEvent::Changing(e) => changing.push(e.clone()),
            CareEvent::Growth(e) => growth.push(e.clone()),
            CareEvent::Sleep(e) => sleep.push(e.clone()),
            CareEvent::Note(e) => notes.push(e.clone()),
        }
    }

    DailyHighlights {
        profile_id: context.profile.id.clone(),
        window_start: context.window.start,
        window_end: context.window.end,
        breast_feeding: reducers::summarize_breast_feedings(&breast),
        bottle_feeding: reducers::summarize_bottle_feedings(&bottle),
        pumping: reducers::summarize_pumping(&pumping),
        changing: reducers::summarize_changings(&changing),
        sleep: reducers::summarize_sleep(&sleep),
        notes: reducers::summarize_notes(&notes),
        weight_change: reducers::weight_change(&growth),
    }
}

/// Display strings for the card
pub fn format_highlights(highlights: &DailyHighlights) -> FormattedHighlights {
    let weight_change = match highlights.weight_change.direction {
        WeightDirection::NotAvailable => "N/A".to_string(),
        WeightDirection::Gained => format!("Gained {}", format_pounds_ounces(highlights.weight_change.magnitude)),
        WeightDirection::Lost => format!("Lost {}", format_pounds_ounces(highlights.weight_change.magnitude)),
    };

    FormattedHighlights {
        breast_feeding_duration: format_minutes_duration(highlights.breast_feeding.total_duration_minutes),
        pumping_duration: format_minutes_duration(highlights.pumping.total_minutes),
        sleep_duration: format_minutes_duration(highlights.sleep.total_minutes),
        weight_change,
    }
}
