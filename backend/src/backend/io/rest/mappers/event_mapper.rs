use crate::backend::domain::commands::events::EventResult;
use crate::backend::domain::models::event::CareEvent;
use shared::{EventRecord, EventResponse};

pub struct EventMapper;

impl EventMapper {
    pub fn to_dto(domain: CareEvent) -> EventRecord {
        match domain {
            CareEvent::Breast(e) => EventRecord::Breast(e),
            CareEvent::Bottle(e) => EventRecord::Bottle(e),
            CareEvent::Pump(e) => EventRecord::Pump(e),
            CareEvent::Changing(e) => EventRecord::Changing(e),
            CareEvent::Growth(e) => EventRecord::Growth(e),
            CareEvent::Sleep(e) => EventRecord::Sleep(e),
            CareEvent::Note(e) => EventRecord::Note(e),
        }
    }

    pub fn to_dtos(domain: Vec<CareEvent>) -> Vec<EventRecord> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_response(result: EventResult) -> EventResponse {
        EventResponse {
            event: Self::to_dto(result.event),
            success_message: result.success_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Note;
    use shared::NotePriority;

    #[test]
    fn test_record_is_tagged_with_kind() {
        let event = CareEvent::Note(Note {
            id: "n1".to_string(),
            priority: NotePriority::Medium,
            value: "Rolled over".to_string(),
            timestamp: "2025-06-13T09:00:00Z".parse().unwrap(),
        });

        let json = serde_json::to_value(EventMapper::to_dto(event)).unwrap();
        assert_eq!(json["kind"], "note");
        assert_eq!(json["value"], "Rolled over");
        assert_eq!(json["priority"], "Medium");
    }
}
