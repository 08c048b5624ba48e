//! Per-domain reducers that fold a slice of events into a summary record.
//!
//! Every reducer is a total function over a borrowed slice: it never sorts or
//! mutates its input and an empty slice yields zeroed counters with `None`
//! for any average.

use shared::{
    BottleFeeding, BottleFeedingSummary, BreastFeeding, BreastFeedingSummary, ChangeType, Changing,
    ChangingSummary, Growth, Note, NotePriority, NoteSummary, Pumping, PumpingSummary, Sleep,
    SleepSummary, WeightChange, WeightDirection,
};

use super::models::event::{has_complete_weights, sleep_minutes};
use super::units::{ceil_to_tenth, ounce_delta};

pub fn summarize_breast_feedings(feeds: &[BreastFeeding]) -> BreastFeedingSummary {
    let count = feeds.len() as u32;
    let total_duration_minutes: u64 = feeds.iter().map(|f| u64::from(f.duration_minutes)).sum();

    let total_ounces_transferred: f64 = feeds
        .iter()
        .filter(|f| has_complete_weights(f))
        .map(|f| {
            ounce_delta(
                f.start_weight_lb.unwrap_or_default(),
                f.start_weight_oz.unwrap_or_default(),
                f.end_weight_lb.unwrap_or_default(),
                f.end_weight_oz.unwrap_or_default(),
            )
        })
        .sum();

    BreastFeedingSummary {
        count,
        total_duration_minutes,
        total_ounces_transferred,
        average_duration_minutes: average(total_duration_minutes as f64, count),
    }
}

pub fn summarize_bottle_feedings(feeds: &[BottleFeeding]) -> BottleFeedingSummary {
    let count = feeds.len() as u32;
    let total_ounces: f64 = feeds.iter().map(|f| f.amount_oz).sum();

    BottleFeedingSummary {
        count,
        total_ounces,
        average_ounces: average(total_ounces, count),
    }
}

/// Rounding is applied once to the combined total, not per session
pub fn summarize_pumping(sessions: &[Pumping]) -> PumpingSummary {
    let raw_ounces: f64 = sessions
        .iter()
        .map(|p| p.left_amount_oz + p.right_amount_oz)
        .sum();

    PumpingSummary {
        count: sessions.len() as u32,
        total_ounces: ceil_to_tenth(raw_ounces),
        total_minutes: sessions.iter().map(|p| u64::from(p.duration_minutes)).sum(),
    }
}

/// A "both" change counts toward wet and dirty alike
pub fn summarize_changings(changes: &[Changing]) -> ChangingSummary {
    changes.iter().fold(
        ChangingSummary { total: changes.len() as u32, ..Default::default() },
        |mut summary, change| {
            match change.change_type {
                ChangeType::Wet => summary.wet_count += 1,
                ChangeType::Dirty => summary.dirty_count += 1,
                ChangeType::Both => {
                    summary.wet_count += 1;
                    summary.dirty_count += 1;
                }
            }
            summary
        },
    )
}

pub fn summarize_sleep(sleeps: &[Sleep]) -> SleepSummary {
    let durations: Vec<u64> = sleeps.iter().map(sleep_minutes).collect();

    SleepSummary {
        count: sleeps.len() as u32,
        total_minutes: durations.iter().sum(),
        longest_minutes: durations.iter().copied().max(),
    }
}

pub fn summarize_notes(notes: &[Note]) -> NoteSummary {
    NoteSummary {
        count: notes.len() as u32,
        high_priority: notes.iter().filter(|n| n.priority == NotePriority::High).count() as u32,
    }
}

/// Compare the newest weighed growth sample against the oldest one.
///
/// Samples without a weight are skipped. Ordering is taken from the
/// timestamps (newest first, ties keep input order), so callers may pass
/// the store's newest-first listing or any other order.
pub fn weight_change(samples: &[Growth]) -> WeightChange {
    let mut weighed: Vec<(&Growth, f64)> = samples
        .iter()
        .filter_map(|g| g.weight_lb.map(|w| (g, w)))
        .collect();

    if weighed.len() < 2 {
        return WeightChange::default();
    }

    weighed.sort_by(|(a, _), (b, _)| b.timestamp.cmp(&a.timestamp));

    let newest = weighed[0].1;
    let oldest = weighed[weighed.len() - 1].1;

    let direction = if newest > oldest {
        WeightDirection::Gained
    } else if newest < oldest {
        WeightDirection::Lost
    } else {
        return WeightChange::default();
    };

    WeightChange { direction, magnitude: (newest - oldest).abs() }
}

fn average(total: f64, count: u32) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(total / f64::from(count))
    }
}
