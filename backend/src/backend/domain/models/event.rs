//! Domain model for care events.
//!
//! Each event kind keeps its own flat record type (shared with the REST
//! layer); `CareEvent` joins them into one tagged union so aggregation code
//! can match on the kind exhaustively.

use chrono::{DateTime, Duration, Utc};
use shared::{
    BottleFeeding, BreastFeeding, Changing, CreateEventRequest, EventField, EventKind, Growth, Note,
    Pumping, Sleep,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CareEvent {
    Breast(BreastFeeding),
    Bottle(BottleFeeding),
    Pump(Pumping),
    Changing(Changing),
    Growth(Growth),
    Sleep(Sleep),
    Note(Note),
}

impl CareEvent {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn kind(&self) -> EventKind {
        match self {
            CareEvent::Breast(_) => EventKind::Breast,
            CareEvent::Bottle(_) => EventKind::Bottle,
            CareEvent::Pump(_) => EventKind::Pump,
            CareEvent::Changing(_) => EventKind::Changing,
            CareEvent::Growth(_) => EventKind::Growth,
            CareEvent::Sleep(_) => EventKind::Sleep,
            CareEvent::Note(_) => EventKind::Note,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CareEvent::Breast(e) => &e.id,
            CareEvent::Bottle(e) => &e.id,
            CareEvent::Pump(e) => &e.id,
            CareEvent::Changing(e) => &e.id,
            CareEvent::Growth(e) => &e.id,
            CareEvent::Sleep(e) => &e.id,
            CareEvent::Note(e) => &e.id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CareEvent::Breast(e) => e.timestamp,
            CareEvent::Bottle(e) => e.timestamp,
            CareEvent::Pump(e) => e.timestamp,
            CareEvent::Changing(e) => e.timestamp,
            CareEvent::Growth(e) => e.timestamp,
            CareEvent::Sleep(e) => e.timestamp,
            CareEvent::Note(e) => e.timestamp,
        }
    }

    /// The instant a range query on `field` compares against.
    /// Only sleep carries a start separate from its timestamp.
    pub fn instant_of(&self, field: EventField) -> DateTime<Utc> {
        match (self, field) {
            (CareEvent::Sleep(e), EventField::Start) => e.start,
            _ => self.timestamp(),
        }
    }

    /// Check the fields a form submission must carry
    pub fn validate(&self) -> Result<(), EventValidationError> {
        match self {
            CareEvent::Breast(e) => {
                if e.duration_minutes == 0 {
                    return Err(EventValidationError::NonPositiveDuration);
                }
                for weight in [e.start_weight_lb, e.start_weight_oz, e.end_weight_lb, e.end_weight_oz]
                    .into_iter()
                    .flatten()
                {
                    check_non_negative(weight, "weight")?;
                }
            }
            CareEvent::Bottle(e) => {
                if !(e.amount_oz > 0.0) {
                    return Err(EventValidationError::NonPositiveAmount);
                }
            }
            CareEvent::Pump(e) => {
                if e.duration_minutes == 0 {
                    return Err(EventValidationError::NonPositiveDuration);
                }
                check_non_negative(e.left_amount_oz, "left amount")?;
                check_non_negative(e.right_amount_oz, "right amount")?;
            }
            CareEvent::Changing(_) => {}
            CareEvent::Growth(e) => {
                let measurements = [e.head_circumference_cm, e.height_in, e.weight_lb];
                for value in measurements.into_iter().flatten() {
                    if !(value > 0.0) {
                        return Err(EventValidationError::NonPositiveMeasurement);
                    }
                }
            }
            CareEvent::Sleep(e) => {
                if e.end < e.start {
                    return Err(EventValidationError::EndBeforeStart);
                }
            }
            CareEvent::Note(e) => {
                if e.value.trim().is_empty() {
                    return Err(EventValidationError::EmptyNote);
                }
                let length = e.value.chars().count();
                if length > MAX_NOTE_LENGTH {
                    return Err(EventValidationError::NoteTooLong(length));
                }
            }
        }
        Ok(())
    }
}

impl CareEvent {
    /// Build a new event from a form submission. Omitted timestamps become
    /// `now`; a breastfeeding without a start is taken to have just ended.
    pub fn from_request(request: CreateEventRequest, id: String, now: DateTime<Utc>) -> CareEvent {
        match request {
            CreateEventRequest::Breast {
                duration_minutes,
                side,
                start_weight_lb,
                start_weight_oz,
                end_weight_lb,
                end_weight_oz,
                notes,
                started_at,
            } => CareEvent::Breast(BreastFeeding {
                id,
                duration_minutes,
                side,
                start_weight_lb,
                start_weight_oz,
                end_weight_lb,
                end_weight_oz,
                notes,
                timestamp: started_at
                    .unwrap_or_else(|| now - Duration::minutes(i64::from(duration_minutes))),
            }),
            CreateEventRequest::Bottle { amount_oz, notes, timestamp } => CareEvent::Bottle(BottleFeeding {
                id,
                amount_oz,
                notes,
                timestamp: timestamp.unwrap_or(now),
            }),
            CreateEventRequest::Pump {
                duration_minutes,
                left_amount_oz,
                right_amount_oz,
                notes,
                timestamp,
            } => CareEvent::Pump(Pumping {
                id,
                duration_minutes,
                left_amount_oz,
                right_amount_oz,
                notes,
                timestamp: timestamp.unwrap_or(now),
            }),
            CreateEventRequest::Changing {
                change_type,
                color,
                consistency,
                notes,
                timestamp,
            } => CareEvent::Changing(Changing {
                id,
                change_type,
                color,
                consistency,
                notes,
                timestamp: timestamp.unwrap_or(now),
            }),
            CreateEventRequest::Growth {
                head_circumference_cm,
                height_in,
                weight_lb,
                notes,
                timestamp,
            } => CareEvent::Growth(Growth {
                id,
                head_circumference_cm,
                height_in,
                weight_lb,
                notes,
                timestamp: timestamp.unwrap_or(now),
            }),
            CreateEventRequest::Sleep { start, end, notes } => CareEvent::Sleep(Sleep {
                id,
                start,
                end,
                notes,
                timestamp: start,
            }),
            CreateEventRequest::Note { priority, value, timestamp } => CareEvent::Note(Note {
                id,
                priority,
                value,
                timestamp: timestamp.unwrap_or(now),
            }),
        }
    }

    /// Payload fields as a JSON object, without the kind tag
    pub fn to_fields(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            CareEvent::Breast(e) => serde_json::to_value(e),
            CareEvent::Bottle(e) => serde_json::to_value(e),
            CareEvent::Pump(e) => serde_json::to_value(e),
            CareEvent::Changing(e) => serde_json::to_value(e),
            CareEvent::Growth(e) => serde_json::to_value(e),
            CareEvent::Sleep(e) => serde_json::to_value(e),
            CareEvent::Note(e) => serde_json::to_value(e),
        }
    }

    /// Rebuild an event of `kind` from its JSON fields
    pub fn from_fields(kind: EventKind, fields: serde_json::Value) -> Result<CareEvent, EventValidationError> {
        let event = match kind {
            EventKind::Breast => CareEvent::Breast(serde_json::from_value(fields).map_err(malformed)?),
            EventKind::Bottle => CareEvent::Bottle(serde_json::from_value(fields).map_err(malformed)?),
            EventKind::Pump => CareEvent::Pump(serde_json::from_value(fields).map_err(malformed)?),
            EventKind::Changing => CareEvent::Changing(serde_json::from_value(fields).map_err(malformed)?),
            EventKind::Growth => CareEvent::Growth(serde_json::from_value(fields).map_err(malformed)?),
            EventKind::Sleep => CareEvent::Sleep(serde_json::from_value(fields).map_err(malformed)?),
            EventKind::Note => CareEvent::Note(serde_json::from_value(fields).map_err(malformed)?),
        };
        Ok(event)
    }

    /// Apply a JSON merge patch and validate the result.
    /// The id never changes and the kind must stay the same; `null` clears an
    /// optional field. A sleep whose `start` moves takes the new start as its
    /// timestamp unless the patch sets one.
    pub fn merge_patch(&self, patch: &serde_json::Value) -> Result<CareEvent, EventValidationError> {
        let changes = patch
            .as_object()
            .ok_or_else(|| EventValidationError::Malformed("patch must be a JSON object".to_string()))?;

        let mut fields = self.to_fields().map_err(malformed)?;
        if let Some(target) = fields.as_object_mut() {
            for (key, value) in changes {
                match key.as_str() {
                    "id" => {}
                    "kind" => {
                        let found: EventKind = serde_json::from_value(value.clone()).map_err(malformed)?;
                        if found != self.kind() {
                            return Err(EventValidationError::KindMismatch {
                                expected: self.kind(),
                                found,
                            });
                        }
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }

            if self.kind() == EventKind::Sleep && !changes.contains_key("timestamp") {
                if let Some(start) = changes.get("start") {
                    target.insert("timestamp".to_string(), start.clone());
                }
            }
        }

        let updated = CareEvent::from_fields(self.kind(), fields)?;
        updated.validate()?;
        Ok(updated)
    }
}

fn malformed(error: serde_json::Error) -> EventValidationError {
    EventValidationError::Malformed(error.to_string())
}

pub const MAX_NOTE_LENGTH: usize = 2000;

fn check_non_negative(value: f64, field: &'static str) -> Result<(), EventValidationError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(EventValidationError::NegativeValue(field))
    }
}

/// Minutes between a sleep's start and end, rounded down
pub fn sleep_minutes(sleep: &Sleep) -> u64 {
    u64::try_from((sleep.end - sleep.start).num_minutes()).unwrap_or(0)
}

/// True when all four scale readings of a breastfeeding were recorded
pub fn has_complete_weights(feed: &BreastFeeding) -> bool {
    feed.start_weight_lb.is_some()
        && feed.start_weight_oz.is_some()
        && feed.end_weight_lb.is_some()
        && feed.end_weight_oz.is_some()
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EventValidationError {
    #[error("Duration must be greater than zero")]
    NonPositiveDuration,
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("The {0} cannot be negative")]
    NegativeValue(&'static str),
    #[error("Measurements must be greater than zero")]
    NonPositiveMeasurement,
    #[error("Sleep cannot end before it starts")]
    EndBeforeStart,
    #[error("Note text cannot be empty")]
    EmptyNote,
    #[error("Note text is too long ({0} characters)")]
    NoteTooLong(usize),
    #[error("Event kind cannot be changed from {expected} to {found}")]
    KindMismatch { expected: EventKind, found: EventKind },
    #[error("Invalid event fields: {0}")]
    Malformed(String),
}
