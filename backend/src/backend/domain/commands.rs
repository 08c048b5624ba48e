//! Domain-level command and query types
//! These structs are used by services inside the domain layer. The REST layer
//! maps the public DTOs defined in the `shared` crate to these internal types.

pub mod events {
    use chrono::{DateTime, Utc};
    use shared::{CreateEventRequest, EventField, EventKind};

    use crate::backend::domain::models::event::CareEvent;

    /// Input for creating a new event of `kind`.
    #[derive(Debug, Clone)]
    pub struct CreateEventCommand {
        pub kind: EventKind,
        pub request: CreateEventRequest,
    }

    /// Query parameters for listing events of one kind.
    /// Without both bounds every event of the kind is returned.
    #[derive(Debug, Clone)]
    pub struct EventListQuery {
        pub kind: EventKind,
        pub start: Option<DateTime<Utc>>,
        pub end: Option<DateTime<Utc>>,
        pub field: EventField,
    }

    /// Partial update keyed by id. `patch` is a JSON merge patch over the
    /// event's fields.
    #[derive(Debug, Clone)]
    pub struct UpdateEventCommand {
        pub kind: EventKind,
        pub event_id: String,
        pub patch: serde_json::Value,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteEventCommand {
        pub kind: EventKind,
        pub event_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct EventResult {
        pub event: CareEvent,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteEventResult {
        pub event_id: String,
        pub success_message: String,
    }
}

pub mod profiles {
    use shared::Gender;

    /// Sign in as `email`, creating an empty profile on first use.
    #[derive(Debug, Clone)]
    pub struct SignInCommand {
        pub email: String,
        pub display_name: Option<String>,
    }

    /// Fields to change on the active profile; `None` leaves a field as is.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateProfileCommand {
        pub first_name: Option<String>,
        pub middle_name: Option<String>,
        pub last_name: Option<String>,
        pub birthday: Option<String>,
        pub gender: Option<Gender>,
    }

    /// The signed-in user
    #[derive(Debug, Clone, PartialEq)]
    pub struct CurrentUser {
        pub email: String,
        pub display_name: Option<String>,
    }
}

pub mod reports {
    use chrono::NaiveDate;
    use shared::{EventKind, PeriodUnit};

    /// Charts reach back three months unless asked otherwise
    pub const DEFAULT_CHART_AMOUNT: u32 = 3;

    #[derive(Debug, Clone, Default)]
    pub struct HighlightsQuery {
        /// Local calendar day; today when absent
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Clone)]
    pub struct ChartQuery {
        pub kind: EventKind,
        pub amount: u32,
        pub unit: PeriodUnit,
    }
}
