use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{BottleFeeding, BreastFeeding, Changing, EventField, EventKind, Growth, Note, Pumping, Sleep};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::connection::{unique_temp_path, CsvConnection};
use super::profile_repository::ProfileRepository;
use crate::backend::domain::models::event::CareEvent;
use crate::backend::storage::traits::EventStorage;

/// CSV-based event repository, one file per event kind
#[derive(Clone)]
pub struct EventRepository {
    connection: CsvConnection,
    profile_repository: ProfileRepository,
}

impl EventRepository {
    pub fn new(connection: CsvConnection) -> Self {
        let profile_repository = ProfileRepository::new(connection.clone());
        Self {
            connection,
            profile_repository,
        }
    }

    async fn profile_directory_name(&self, profile_email: &str) -> Result<String> {
        self.profile_repository
            .find_directory_by_email(profile_email)
            .await?
            .ok_or_else(|| anyhow!("Profile not found: {}", profile_email))
    }

    /// Read every event of `kind` for a profile, in file order
    fn read_events(&self, directory_name: &str, kind: EventKind) -> Result<Vec<CareEvent>> {
        let path = self.connection.collection_file_path(directory_name, kind);

        let events = match kind {
            EventKind::Breast => read_rows::<BreastFeeding>(&path)?.into_iter().map(CareEvent::Breast).collect(),
            EventKind::Bottle => read_rows::<BottleFeeding>(&path)?.into_iter().map(CareEvent::Bottle).collect(),
            EventKind::Pump => read_rows::<Pumping>(&path)?.into_iter().map(CareEvent::Pump).collect(),
            EventKind::Changing => read_rows::<Changing>(&path)?.into_iter().map(CareEvent::Changing).collect(),
            EventKind::Growth => read_rows::<Growth>(&path)?.into_iter().map(CareEvent::Growth).collect(),
            EventKind::Sleep => read_rows::<Sleep>(&path)?.into_iter().map(CareEvent::Sleep).collect(),
            EventKind::Note => read_rows::<Note>(&path)?.into_iter().map(CareEvent::Note).collect(),
        };

        Ok(events)
    }

    /// Rewrite the collection for `kind`. Events of any other kind are skipped.
    fn write_events(&self, directory_name: &str, kind: EventKind, events: &[CareEvent]) -> Result<()> {
        self.connection.ensure_profile_directory(directory_name)?;
        let path = self.connection.collection_file_path(directory_name, kind);

        match kind {
            EventKind::Breast => {
                let rows: Vec<&BreastFeeding> = events
                    .iter()
                    .filter_map(|e| match e {
                        CareEvent::Breast(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                write_rows(&path, &rows)
            }
            EventKind::Bottle => {
                let rows: Vec<&BottleFeeding> = events
                    .iter()
                    .filter_map(|e| match e {
                        CareEvent::Bottle(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                write_rows(&path, &rows)
            }
            EventKind::Pump => {
                let rows: Vec<&Pumping> = events
                    .iter()
                    .filter_map(|e| match e {
                        CareEvent::Pump(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                write_rows(&path, &rows)
            }
            EventKind::Changing => {
                let rows: Vec<&Changing> = events
                    .iter()
                    .filter_map(|e| match e {
                        CareEvent::Changing(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                write_rows(&path, &rows)
            }
            EventKind::Growth => {
                let rows: Vec<&Growth> = events
                    .iter()
                    .filter_map(|e| match e {
                        CareEvent::Growth(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                write_rows(&path, &rows)
            }
            EventKind::Sleep => {
                let rows: Vec<&Sleep> = events
                    .iter()
                    .filter_map(|e| match e {
                        CareEvent::Sleep(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                write_rows(&path, &rows)
            }
            EventKind::Note => {
                let rows: Vec<&Note> = events
                    .iter()
                    .filter_map(|e| match e {
                        CareEvent::Note(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                write_rows(&path, &rows)
            }
        }
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut csv_reader = Reader::from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<T>() {
        rows.push(result.with_context(|| format!("Malformed row in {}", path.display()))?);
    }

    Ok(rows)
}

/// Atomic write: serialize into a temp file, then rename it over `path`
fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let temp_path = unique_temp_path(path);

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut csv_writer = Writer::from_writer(BufWriter::new(file));
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
    }

    fs::rename(&temp_path, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

fn sort_newest_first(events: &mut [CareEvent], field: EventField) {
    events.sort_by(|a, b| b.instant_of(field).cmp(&a.instant_of(field)));
}

#[async_trait]
impl EventStorage for EventRepository {
    async fn store_event(&self, profile_email: &str, event: &CareEvent) -> Result<()> {
        let _guard = self.connection.lock_writes().await;
        let directory_name = self.profile_directory_name(profile_email).await?;
        let kind = event.kind();

        let mut events = self.read_events(&directory_name, kind)?;
        events.push(event.clone());
        sort_newest_first(&mut events, EventField::Timestamp);
        self.write_events(&directory_name, kind, &events)?;

        info!("Stored {} event {} for {}", kind, event.id(), directory_name);
        Ok(())
    }

    async fn get_event(&self, profile_email: &str, kind: EventKind, event_id: &str) -> Result<Option<CareEvent>> {
        let directory_name = self.profile_directory_name(profile_email).await?;
        let events = self.read_events(&directory_name, kind)?;
        Ok(events.into_iter().find(|e| e.id() == event_id))
    }

    async fn list_events(&self, profile_email: &str, kind: EventKind) -> Result<Vec<CareEvent>> {
        let directory_name = self.profile_directory_name(profile_email).await?;
        let mut events = self.read_events(&directory_name, kind)?;
        sort_newest_first(&mut events, EventField::Timestamp);

        debug!("Listed {} {} events for {}", events.len(), kind, directory_name);
        Ok(events)
    }

    async fn list_events_in_range(
        &self,
        profile_email: &str,
        kind: EventKind,
        field: EventField,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CareEvent>> {
        let directory_name = self.profile_directory_name(profile_email).await?;

        let mut events: Vec<CareEvent> = self
            .read_events(&directory_name, kind)?
            .into_iter()
            .filter(|e| {
                let instant = e.instant_of(field);
                instant >= start && instant <= end
            })
            .collect();
        sort_newest_first(&mut events, field);

        debug!(
            "Listed {} {} events between {} and {} for {}",
            events.len(),
            kind,
            start,
            end,
            directory_name
        );
        Ok(events)
    }

    async fn update_event(&self, profile_email: &str, event: &CareEvent) -> Result<bool> {
        let _guard = self.connection.lock_writes().await;
        let directory_name = self.profile_directory_name(profile_email).await?;
        let kind = event.kind();

        let mut events = self.read_events(&directory_name, kind)?;
        let position = match events.iter().position(|e| e.id() == event.id()) {
            Some(position) => position,
            None => return Ok(false),
        };

        events[position] = event.clone();
        sort_newest_first(&mut events, EventField::Timestamp);
        self.write_events(&directory_name, kind, &events)?;

        info!("Updated {} event {} for {}", kind, event.id(), directory_name);
        Ok(true)
    }

    async fn delete_event(&self, profile_email: &str, kind: EventKind, event_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_writes().await;
        let directory_name = self.profile_directory_name(profile_email).await?;

        let mut events = self.read_events(&directory_name, kind)?;
        let original_len = events.len();
        events.retain(|e| e.id() != event_id);

        if events.len() == original_len {
            return Ok(false);
        }

        self.write_events(&directory_name, kind, &events)?;
        info!("Deleted {} event {} for {}", kind, event_id, directory_name);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use shared::{BreastSide, NotePriority};

    const EMAIL: &str = "parent@example.com";

    fn ts(rfc3339: &str) -> DateTime<Utc> {
        rfc3339.parse().unwrap()
    }

    fn bottle(id: &str, amount_oz: f64, timestamp: &str) -> CareEvent {
        CareEvent::Bottle(BottleFeeding {
            id: id.to_string(),
            amount_oz,
            notes: None,
            timestamp: ts(timestamp),
        })
    }

    fn sleep(id: &str, start: &str, end: &str) -> CareEvent {
        CareEvent::Sleep(Sleep {
            id: id.to_string(),
            start: ts(start),
            end: ts(end),
            notes: None,
            timestamp: ts(start),
        })
    }

    async fn setup() -> (TestEnvironment, EventRepository) {
        let env = TestEnvironment::new().await.unwrap();
        env.create_test_profile(EMAIL).await.unwrap();
        let repo = EventRepository::new(env.connection.clone());
        (env, repo)
    }

    #[tokio::test]
    async fn test_store_and_retrieve_event() {
        let (env, repo) = setup().await;

        let feed = CareEvent::Breast(BreastFeeding {
            id: "feed-1".to_string(),
            duration_minutes: 20,
            side: BreastSide::Left,
            start_weight_lb: Some(10.0),
            start_weight_oz: Some(2.0),
            end_weight_lb: None,
            end_weight_oz: None,
            notes: Some("latched well, then \"fussy\"\nfell asleep".to_string()),
            timestamp: ts("2025-06-13T09:00:00Z"),
        });
        repo.store_event(EMAIL, &feed).await.unwrap();

        assert!(env.base_path.join("parent_example_com").join("breast.csv").exists());

        let retrieved = repo.get_event(EMAIL, EventKind::Breast, "feed-1").await.unwrap();
        assert_eq!(retrieved, Some(feed));

        assert!(repo.get_event(EMAIL, EventKind::Bottle, "feed-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_events_survive_a_new_repository() {
        let (env, repo) = setup().await;

        let note = CareEvent::Note(Note {
            id: "n1".to_string(),
            priority: NotePriority::High,
            value: "Pediatrician visit, bring records".to_string(),
            timestamp: ts("2025-06-13T09:00:00Z"),
        });
        repo.store_event(EMAIL, &note).await.unwrap();

        let reopened = EventRepository::new(CsvConnection::new(&env.base_path).unwrap());
        assert_eq!(reopened.list_events(EMAIL, EventKind::Note).await.unwrap(), vec![note]);
    }

    #[tokio::test]
    async fn test_list_events_newest_first() {
        let (_env, repo) = setup().await;

        repo.store_event(EMAIL, &bottle("b2", 2.0, "2025-06-13T12:00:00Z")).await.unwrap();
        repo.store_event(EMAIL, &bottle("b1", 1.0, "2025-06-13T08:00:00Z")).await.unwrap();
        repo.store_event(EMAIL, &bottle("b3", 3.0, "2025-06-13T18:00:00Z")).await.unwrap();

        let ids: Vec<String> = repo
            .list_events(EMAIL, EventKind::Bottle)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b3", "b2", "b1"]);

        assert!(repo.list_events(EMAIL, EventKind::Pump).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_range_is_inclusive_on_both_ends() {
        let (_env, repo) = setup().await;

        repo.store_event(EMAIL, &bottle("before", 1.0, "2025-06-12T23:59:59Z")).await.unwrap();
        repo.store_event(EMAIL, &bottle("start", 1.0, "2025-06-13T00:00:00Z")).await.unwrap();
        repo.store_event(EMAIL, &bottle("end", 1.0, "2025-06-13T23:59:59Z")).await.unwrap();
        repo.store_event(EMAIL, &bottle("after", 1.0, "2025-06-14T00:00:00Z")).await.unwrap();

        let events = repo
            .list_events_in_range(
                EMAIL,
                EventKind::Bottle,
                EventField::Timestamp,
                ts("2025-06-13T00:00:00Z"),
                ts("2025-06-13T23:59:59Z"),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["end", "start"]);
    }

    #[tokio::test]
    async fn test_range_on_sleep_start() {
        let (_env, repo) = setup().await;

        let overnight = CareEvent::Sleep(Sleep {
            id: "overnight".to_string(),
            start: ts("2025-06-12T22:00:00Z"),
            end: ts("2025-06-13T05:00:00Z"),
            notes: None,
            timestamp: ts("2025-06-13T05:00:00Z"),
        });
        repo.store_event(EMAIL, &overnight).await.unwrap();
        repo.store_event(EMAIL, &sleep("nap", "2025-06-13T13:00:00Z", "2025-06-13T14:00:00Z"))
            .await
            .unwrap();

        let by_start = repo
            .list_events_in_range(
                EMAIL,
                EventKind::Sleep,
                EventField::Start,
                ts("2025-06-13T00:00:00Z"),
                ts("2025-06-13T23:59:59Z"),
            )
            .await
            .unwrap();
        assert_eq!(by_start.len(), 1);
        assert_eq!(by_start[0].id(), "nap");

        let by_timestamp = repo
            .list_events_in_range(
                EMAIL,
                EventKind::Sleep,
                EventField::Timestamp,
                ts("2025-06-13T00:00:00Z"),
                ts("2025-06-13T23:59:59Z"),
            )
            .await
            .unwrap();
        assert_eq!(by_timestamp.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stores_keep_every_event() {
        let (_env, repo) = setup().await;

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    let event = bottle(&format!("b{}", i), 1.0, "2025-06-13T08:00:00Z");
                    repo.store_event(EMAIL, &event).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repo.list_events(EMAIL, EventKind::Bottle).await.unwrap();
        assert_eq!(stored.len(), 40);
    }

    #[tokio::test]
    async fn test_update_event() {
        let (_env, repo) = setup().await;

        repo.store_event(EMAIL, &bottle("b1", 1.0, "2025-06-13T08:00:00Z")).await.unwrap();

        assert!(repo.update_event(EMAIL, &bottle("b1", 4.5, "2025-06-13T08:00:00Z")).await.unwrap());
        assert!(!repo.update_event(EMAIL, &bottle("missing", 4.5, "2025-06-13T08:00:00Z")).await.unwrap());

        let updated = repo.get_event(EMAIL, EventKind::Bottle, "b1").await.unwrap().unwrap();
        assert_eq!(updated, bottle("b1", 4.5, "2025-06-13T08:00:00Z"));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let (_env, repo) = setup().await;

        repo.store_event(EMAIL, &bottle("keep", 1.0, "2025-06-13T08:00:00Z")).await.unwrap();
        repo.store_event(EMAIL, &bottle("drop", 2.0, "2025-06-13T09:00:00Z")).await.unwrap();

        assert!(repo.delete_event(EMAIL, EventKind::Bottle, "drop").await.unwrap());
        assert!(!repo.delete_event(EMAIL, EventKind::Bottle, "drop").await.unwrap());

        let remaining = repo.list_events(EMAIL, EventKind::Bottle).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), "keep");
    }

    #[tokio::test]
    async fn test_unknown_profile_is_an_error() {
        let (_env, repo) = setup().await;
        assert!(repo.list_events("ghost@example.com", EventKind::Bottle).await.is_err());
    }
}
