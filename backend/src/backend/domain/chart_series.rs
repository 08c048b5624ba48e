//! Trend chart series built from events grouped by calendar day.
//!
//! Additive series sum each numeric field per day. Growth samples are point
//! measurements and map one-to-one onto chart points instead.

use chrono::{DateTime, TimeZone, Utc};
use shared::{BottleFeeding, BreastFeeding, ChangeType, Changing, EventKind, Growth, GrowthPoint, Pumping, SeriesPoint, Sleep};
use std::collections::HashMap;

use super::models::event::{sleep_minutes, CareEvent};

/// A named numeric field read off an event
pub type SeriesField<T> = (&'static str, fn(&T) -> f64);

/// Calendar date of `instant` in `tz`, formatted YYYY-MM-DD
pub fn local_date_key<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).date_naive().format("%Y-%m-%d").to_string()
}

/// One point per distinct date key, in first-seen order.
///
/// The first event of a day seeds every field with its own value and later
/// events of that day add to it, so each value is the per-day sum.
pub fn build_additive_series<T, K>(events: &[T], date_key_of: K, fields: &[SeriesField<T>]) -> Vec<SeriesPoint>
where
    K: Fn(&T) -> String,
{
    let mut points: Vec<SeriesPoint> = Vec::new();
    let mut index_by_date: HashMap<String, usize> = HashMap::new();

    for event in events {
        let date = date_key_of(event);

        match index_by_date.get(&date) {
            Some(&index) => {
                let values = &mut points[index].values;
                for (name, value_of) in fields {
                    *values.entry(name.to_string()).or_insert(0.0) += value_of(event);
                }
            }
            None => {
                let values = fields
                    .iter()
                    .map(|(name, value_of)| (name.to_string(), value_of(event)))
                    .collect();
                index_by_date.insert(date.clone(), points.len());
                points.push(SeriesPoint { date, values });
            }
        }
    }

    points
}

/// Order points chronologically; YYYY-MM-DD keys sort correctly as strings
pub fn sort_series(points: &mut [SeriesPoint]) {
    points.sort_by(|a, b| a.date.cmp(&b.date));
}

/// One chart point per growth sample, ascending by date. Missing
/// measurements stay `None` and are omitted when serialized.
pub fn build_growth_series<K>(samples: &[Growth], date_key_of: K) -> Vec<GrowthPoint>
where
    K: Fn(&Growth) -> String,
{
    let mut points: Vec<GrowthPoint> = samples
        .iter()
        .map(|g| GrowthPoint {
            date: date_key_of(g),
            weight: g.weight_lb,
            height: g.height_in,
        })
        .collect();

    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

/// The standard additive chart for an event kind, sorted by date.
/// Returns `None` for kinds that have no additive chart (growth, notes).
pub fn build_kind_series<Tz: TimeZone>(kind: EventKind, events: &[CareEvent], tz: &Tz) -> Option<Vec<SeriesPoint>> {
    let mut points = match kind {
        EventKind::Breast => {
            let feeds: Vec<BreastFeeding> = events
                .iter()
                .filter_map(|e| match e {
                    CareEvent::Breast(f) => Some(f.clone()),
                    _ => None,
                })
                .collect();
            // A breastfeeding timestamp is the feed start
            build_additive_series(
                &feeds,
                |f| local_date_key(&f.timestamp, tz),
                &[("duration", |f: &BreastFeeding| f64::from(f.duration_minutes))],
            )
        }
        EventKind::Bottle => {
            let feeds: Vec<BottleFeeding> = events
                .iter()
                .filter_map(|e| match e {
                    CareEvent::Bottle(f) => Some(f.clone()),
                    _ => None,
                })
                .collect();
            build_additive_series(
                &feeds,
                |f| local_date_key(&f.timestamp, tz),
                &[("amount", |f: &BottleFeeding| f.amount_oz)],
            )
        }
        EventKind::Pump => {
            let sessions: Vec<Pumping> = events
                .iter()
                .filter_map(|e| match e {
                    CareEvent::Pump(p) => Some(p.clone()),
                    _ => None,
                })
                .collect();
            build_additive_series(
                &sessions,
                |p| local_date_key(&p.timestamp, tz),
                &[
                    ("amount", |p: &Pumping| p.left_amount_oz + p.right_amount_oz),
                    ("duration", |p: &Pumping| f64::from(p.duration_minutes)),
                ],
            )
        }
        EventKind::Changing => {
            let changes: Vec<Changing> = events
                .iter()
                .filter_map(|e| match e {
                    CareEvent::Changing(c) => Some(c.clone()),
                    _ => None,
                })
                .collect();
            build_additive_series(
                &changes,
                |c| local_date_key(&c.timestamp, tz),
                &[
                    ("wet", |c: &Changing| if c.change_type == ChangeType::Dirty { 0.0 } else { 1.0 }),
                    ("dirty", |c: &Changing| if c.change_type == ChangeType::Wet { 0.0 } else { 1.0 }),
                ],
            )
        }
        EventKind::Sleep => {
            let sleeps: Vec<Sleep> = events
                .iter()
                .filter_map(|e| match e {
                    CareEvent::Sleep(s) => Some(s.clone()),
                    _ => None,
                })
                .collect();
            // Sleep is charted on the day it started
            build_additive_series(
                &sleeps,
                |s| local_date_key(&s.start, tz),
                &[("duration", |s: &Sleep| sleep_minutes(s) as f64)],
            )
        }
        EventKind::Growth | EventKind::Note => return None,
    };

    sort_series(&mut points);
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use shared::BreastSide;

    fn ts(rfc3339: &str) -> DateTime<Utc> {
        rfc3339.parse().unwrap()
    }

    fn feed(duration: u32, timestamp: &str) -> BreastFeeding {
        BreastFeeding {
            id: timestamp.to_string(),
            duration_minutes: duration,
            side: BreastSide::Left,
            start_weight_lb: None,
            start_weight_oz: None,
            end_weight_lb: None,
            end_weight_oz: None,
            notes: None,
            timestamp: ts(timestamp),
        }
    }

    fn growth(weight: Option<f64>, height: Option<f64>, timestamp: &str) -> Growth {
        Growth {
            id: timestamp.to_string(),
            head_circumference_cm: None,
            height_in: height,
            weight_lb: weight,
            notes: None,
            timestamp: ts(timestamp),
        }
    }

    fn duration_field() -> [SeriesField<BreastFeeding>; 1] {
        [("duration", |f: &BreastFeeding| f64::from(f.duration_minutes))]
    }

    #[test]
    fn test_same_day_values_are_summed() {
        let feeds = vec![
            feed(10, "2025-06-13T08:00:00Z"),
            feed(15, "2025-06-13T13:00:00Z"),
        ];

        let points = build_additive_series(&feeds, |f| local_date_key(&f.timestamp, &Utc), &duration_field());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "2025-06-13");
        assert_eq!(points[0].values["duration"], 25.0);
    }

    #[test]
    fn test_first_event_is_not_counted_twice() {
        let feeds = vec![feed(7, "2025-06-13T08:00:00Z")];
        let points = build_additive_series(&feeds, |f| local_date_key(&f.timestamp, &Utc), &duration_field());
        assert_eq!(points[0].values["duration"], 7.0);
    }

    #[test]
    fn test_points_follow_first_seen_order_until_sorted() {
        let feeds = vec![
            feed(10, "2025-06-14T08:00:00Z"),
            feed(5, "2025-06-12T08:00:00Z"),
            feed(20, "2025-06-14T18:00:00Z"),
        ];

        let mut points = build_additive_series(&feeds, |f| local_date_key(&f.timestamp, &Utc), &duration_field());
        let dates: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-06-14", "2025-06-12"]);

        sort_series(&mut points);
        assert_eq!(points[0].date, "2025-06-12");
        assert_eq!(points[1].values["duration"], 30.0);
    }

    #[test]
    fn test_local_date_key_respects_time_zone() {
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(local_date_key(&ts("2025-06-14T03:00:00Z"), &eastern), "2025-06-13");
        assert_eq!(local_date_key(&ts("2025-06-14T03:00:00Z"), &Utc), "2025-06-14");
    }

    #[test]
    fn test_growth_series_is_sorted_and_sparse() {
        let samples = vec![
            growth(Some(12.0), None, "2025-06-13T09:00:00Z"),
            growth(None, None, "2025-06-01T09:00:00Z"),
            growth(Some(10.0), Some(21.5), "2025-05-13T09:00:00Z"),
        ];

        let points = build_growth_series(&samples, |g| local_date_key(&g.timestamp, &Utc));
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, "2025-05-13");
        assert_eq!(points[0].height, Some(21.5));
        assert_eq!(points[1].date, "2025-06-01");
        assert_eq!(points[1].weight, None);
        assert_eq!(points[1].height, None);
        assert_eq!(points[2].weight, Some(12.0));
        assert_eq!(points[2].height, None);

        let json = serde_json::to_value(&points[1]).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2025-06-01"}));
    }

    #[test]
    fn test_sleep_series_keys_by_start() {
        let events = vec![CareEvent::Sleep(Sleep {
            id: "s".to_string(),
            start: ts("2025-06-12T23:30:00Z"),
            end: ts("2025-06-13T01:00:00Z"),
            notes: None,
            timestamp: ts("2025-06-13T01:00:00Z"),
        })];

        let points = build_kind_series(EventKind::Sleep, &events, &Utc).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "2025-06-12");
        assert_eq!(points[0].values["duration"], 90.0);
    }

    #[test]
    fn test_changing_series_counts_both_as_wet_and_dirty() {
        let events: Vec<CareEvent> = [ChangeType::Both, ChangeType::Wet]
            .iter()
            .map(|t| {
                CareEvent::Changing(Changing {
                    id: "c".to_string(),
                    change_type: *t,
                    color: None,
                    consistency: None,
                    notes: None,
                    timestamp: ts("2025-06-13T09:00:00Z"),
                })
            })
            .collect();

        let points = build_kind_series(EventKind::Changing, &events, &Utc).unwrap();
        assert_eq!(points[0].values["wet"], 2.0);
        assert_eq!(points[0].values["dirty"], 1.0);
    }

    #[test]
    fn test_growth_and_notes_have_no_additive_series() {
        assert!(build_kind_series(EventKind::Growth, &[], &Utc).is_none());
        assert!(build_kind_series(EventKind::Note, &[], &Utc).is_none());
    }
}
