use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of care event. Doubles as the collection name in the event store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Breast,
    Bottle,
    Pump,
    Changing,
    Growth,
    Sleep,
    Note,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Breast,
        EventKind::Bottle,
        EventKind::Pump,
        EventKind::Changing,
        EventKind::Growth,
        EventKind::Sleep,
        EventKind::Note,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Breast => "breast",
            EventKind::Bottle => "bottle",
            EventKind::Pump => "pump",
            EventKind::Changing => "changing",
            EventKind::Growth => "growth",
            EventKind::Sleep => "sleep",
            EventKind::Note => "note",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instant field a range query filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventField {
    #[default]
    Timestamp,
    /// Explicit start time (sleep); falls back to the timestamp for other kinds
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreastSide {
    Left,
    Right,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Wet,
    Dirty,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotePriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Other,
}

/// A breastfeeding session. `timestamp` marks the start of the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreastFeeding {
    pub id: String,
    pub duration_minutes: u32,
    pub side: BreastSide,
    /// Baby weight before the feed, split into pounds and ounces
    pub start_weight_lb: Option<f64>,
    pub start_weight_oz: Option<f64>,
    /// Baby weight after the feed
    pub end_weight_lb: Option<f64>,
    pub end_weight_oz: Option<f64>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleFeeding {
    pub id: String,
    /// Amount fed in ounces
    pub amount_oz: f64,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pumping {
    pub id: String,
    pub duration_minutes: u32,
    pub left_amount_oz: f64,
    pub right_amount_oz: f64,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changing {
    pub id: String,
    pub change_type: ChangeType,
    pub color: Option<String>,
    pub consistency: Option<String>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A growth measurement. Any subset of the three measurements may be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    pub id: String,
    pub head_circumference_cm: Option<f64>,
    pub height_in: Option<f64>,
    /// Weight in fractional pounds
    pub weight_lb: Option<f64>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sleep {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub priority: NotePriority,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// Any care event as exchanged with the UI, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventRecord {
    Breast(BreastFeeding),
    Bottle(BottleFeeding),
    Pump(Pumping),
    Changing(Changing),
    Growth(Growth),
    Sleep(Sleep),
    Note(Note),
}

/// Form submission for a new event. Timestamps default to "now" when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CreateEventRequest {
    Breast {
        duration_minutes: u32,
        side: BreastSide,
        #[serde(default)]
        start_weight_lb: Option<f64>,
        #[serde(default)]
        start_weight_oz: Option<f64>,
        #[serde(default)]
        end_weight_lb: Option<f64>,
        #[serde(default)]
        end_weight_oz: Option<f64>,
        #[serde(default)]
        notes: Option<String>,
        /// Feed start; defaults to now minus the duration
        #[serde(default)]
        started_at: Option<DateTime<Utc>>,
    },
    Bottle {
        amount_oz: f64,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    Pump {
        duration_minutes: u32,
        left_amount_oz: f64,
        right_amount_oz: f64,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    Changing {
        change_type: ChangeType,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        consistency: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    Growth {
        #[serde(default)]
        head_circumference_cm: Option<f64>,
        #[serde(default)]
        height_in: Option<f64>,
        #[serde(default)]
        weight_lb: Option<f64>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    Sleep {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        #[serde(default)]
        notes: Option<String>,
    },
    Note {
        priority: NotePriority,
        value: String,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
}

/// Query for listing events of one kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventListRequest {
    /// Inclusive lower bound (RFC 3339)
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound (RFC 3339)
    pub end: Option<DateTime<Utc>>,
    pub field: Option<EventField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListResponse {
    pub kind: EventKind,
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub event: EventRecord,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEventResponse {
    pub id: String,
    pub success_message: String,
}

/// Child profile as exposed to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    /// Birthday in YYYY-MM-DD format
    pub birthday: Option<String>,
    pub gender: Option<Gender>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub success_message: String,
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: CurrentUser,
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreastFeedingSummary {
    pub count: u32,
    pub total_duration_minutes: u64,
    /// Sum of per-feed weight deltas, only over feeds with all four weights
    pub total_ounces_transferred: f64,
    /// None when there are no feeds
    pub average_duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BottleFeedingSummary {
    pub count: u32,
    pub total_ounces: f64,
    pub average_ounces: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PumpingSummary {
    pub count: u32,
    /// Combined left and right amount, rounded up to one decimal
    pub total_ounces: f64,
    pub total_minutes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangingSummary {
    pub wet_count: u32,
    pub dirty_count: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepSummary {
    pub count: u32,
    pub total_minutes: u64,
    pub longest_minutes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub count: u32,
    pub high_priority: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeightDirection {
    Gained,
    Lost,
    #[default]
    #[serde(rename = "N/A")]
    NotAvailable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightChange {
    pub direction: WeightDirection,
    /// Absolute change in pounds; 0 when the direction is N/A
    pub magnitude: f64,
}

/// The composed daily summary shown on the Highlights card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHighlights {
    pub profile_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub breast_feeding: BreastFeedingSummary,
    pub bottle_feeding: BottleFeedingSummary,
    pub pumping: PumpingSummary,
    pub changing: ChangingSummary,
    pub sleep: SleepSummary,
    pub notes: NoteSummary,
    pub weight_change: WeightChange,
}

/// Display strings for the Highlights card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedHighlights {
    pub breast_feeding_duration: String,
    pub pumping_duration: String,
    pub sleep_duration: String,
    pub weight_change: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightsResponse {
    pub highlights: DailyHighlights,
    pub formatted: FormattedHighlights,
}

/// One `{date, value(s)}` tuple of an additive trend chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Calendar date key, YYYY-MM-DD
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// One growth sample; absent measurements are omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Day,
    Week,
    #[default]
    Month,
}

/// Query for a trend chart window ending today
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub amount: Option<u32>,
    pub unit: Option<PeriodUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeriesResponse {
    pub kind: EventKind,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthChartResponse {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub points: Vec<GrowthPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_record_is_tagged_by_kind() {
        let record = EventRecord::Note(Note {
            id: "n1".to_string(),
            priority: NotePriority::High,
            value: "Call the pediatrician".to_string(),
            timestamp: "2025-06-13T09:00:00Z".parse().unwrap(),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "note");
        assert_eq!(json["priority"], "High");

        let back: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_create_request_optional_fields_default() {
        let json = r#"{"kind":"bottle","amount_oz":4.5}"#;
        let request: CreateEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request,
            CreateEventRequest::Bottle { amount_oz: 4.5, notes: None, timestamp: None }
        );
    }

    #[test]
    fn test_weight_direction_not_available_serializes_as_na() {
        let json = serde_json::to_string(&WeightDirection::NotAvailable).unwrap();
        assert_eq!(json, "\"N/A\"");
    }

    #[test]
    fn test_series_point_flattens_values() {
        let mut values = BTreeMap::new();
        values.insert("duration".to_string(), 25.0);
        let point = SeriesPoint { date: "2025-06-13".to_string(), values };

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["date"], "2025-06-13");
        assert_eq!(json["duration"], 25.0);
    }

    #[test]
    fn test_growth_point_omits_missing_measurements() {
        let point = GrowthPoint { date: "2025-06-13".to_string(), weight: Some(9.5), height: None };
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"date":"2025-06-13","weight":9.5}"#);
    }
}
