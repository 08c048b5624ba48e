//! Time windows used to filter events before aggregation.
//!
//! Bounds are computed in the time zone of the reference instant (local time
//! for the services) and returned as UTC instants. Both ends are inclusive.
//! The end of a day is 23:59:59, one second short of the next midnight.

use chrono::{DateTime, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use shared::PeriodUnit;

const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Inclusive time range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

/// Start and end (23:59:59) of the calendar day containing `instant`
pub fn day_bounds<Tz: TimeZone>(instant: &DateTime<Tz>) -> TimeWindow {
    let tz = instant.timezone();
    let date = instant.date_naive();
    TimeWindow::new(start_of_day(&tz, date), end_of_day(&tz, date))
}

/// Window reaching back `amount` units from `instant`, widened to whole days
pub fn period_bounds<Tz: TimeZone>(instant: &DateTime<Tz>, amount: u32, unit: PeriodUnit) -> TimeWindow {
    let tz = instant.timezone();
    let today = instant.date_naive();

    let first_day = match unit {
        PeriodUnit::Day => today.checked_sub_days(Days::new(u64::from(amount))),
        PeriodUnit::Week => today.checked_sub_days(Days::new(u64::from(amount) * 7)),
        PeriodUnit::Month => today.checked_sub_months(Months::new(amount)),
    }
    .unwrap_or(NaiveDate::MIN);

    TimeWindow::new(start_of_day(&tz, first_day), end_of_day(&tz, today))
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(tz, date.and_time(NaiveTime::MIN))
}

fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(tz, date.and_time(NaiveTime::MIN) + Duration::seconds(LAST_SECOND_OF_DAY))
}

/// Resolve a wall-clock time; ambiguous times take the earlier instant and
/// times skipped by a DST jump are read as UTC offsets of the zone.
fn local_to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
        .with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn eastern(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn utc(rfc3339: &str) -> DateTime<Utc> {
        rfc3339.parse().unwrap()
    }

    #[test]
    fn test_day_bounds_uses_local_midnight() {
        let window = day_bounds(&eastern("2025-06-13T15:30:00-05:00"));
        assert_eq!(window.start, utc("2025-06-13T05:00:00Z"));
        assert_eq!(window.end, utc("2025-06-14T04:59:59Z"));
    }

    #[test]
    fn test_day_bounds_end_is_one_second_before_midnight() {
        let window = day_bounds(&utc("2025-06-13T00:00:00Z"));
        assert!(window.contains(&utc("2025-06-13T23:59:59Z")));
        assert!(!window.contains(&utc("2025-06-13T23:59:59.500Z")));
        assert!(!window.contains(&utc("2025-06-14T00:00:00Z")));
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = TimeWindow::new(utc("2025-06-01T00:00:00Z"), utc("2025-06-02T00:00:00Z"));
        assert!(window.contains(&utc("2025-06-01T00:00:00Z")));
        assert!(window.contains(&utc("2025-06-02T00:00:00Z")));
        assert!(!window.contains(&utc("2025-05-31T23:59:59Z")));
    }

    #[test]
    fn test_period_bounds_months() {
        let window = period_bounds(&eastern("2025-06-13T15:30:00-05:00"), 3, PeriodUnit::Month);
        assert_eq!(window.start, utc("2025-03-13T05:00:00Z"));
        assert_eq!(window.end, utc("2025-06-14T04:59:59Z"));
    }

    #[test]
    fn test_period_bounds_month_end_clamps() {
        let window = period_bounds(&utc("2025-05-31T12:00:00Z"), 3, PeriodUnit::Month);
        assert_eq!(window.start, utc("2025-02-28T00:00:00Z"));
    }

    #[test]
    fn test_period_bounds_weeks_and_days() {
        let now = utc("2025-06-13T08:00:00Z");
        assert_eq!(period_bounds(&now, 2, PeriodUnit::Week).start, utc("2025-05-30T00:00:00Z"));
        assert_eq!(period_bounds(&now, 1, PeriodUnit::Day).start, utc("2025-06-12T00:00:00Z"));
        assert_eq!(period_bounds(&now, 0, PeriodUnit::Day), day_bounds(&now));
    }
}
