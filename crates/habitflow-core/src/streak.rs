//! Streak computation over append-only date logs.
//!
//! Everything here is a pure, replayable function: the caller passes the
//! subject's check-in dates plus `today`, and nothing is ever mutated.
//! Daily subjects chain consecutive calendar days; weekly subjects chain
//! occurrences of their target weekdays, with grace when today is not
//! itself a target day yet.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date::weekday_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

/// Derived per-habit statistics bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    /// 30-day completion rate, 0-100.
    pub completion_rate: u8,
}

fn is_target_day(date: NaiveDate, target_days: &[u8]) -> bool {
    target_days.is_empty() || target_days.contains(&weekday_index(date))
}

/// Most recent expected day before `from`: yesterday for daily subjects,
/// the nearest prior target weekday (searched back up to 7 days) for
/// weekly ones.
fn previous_target_day(from: NaiveDate, target_days: &[u8]) -> NaiveDate {
    let mut date = from - Duration::days(1);
    if target_days.is_empty() {
        return date;
    }
    for _ in 0..7 {
        if target_days.contains(&weekday_index(date)) {
            return date;
        }
        date -= Duration::days(1);
    }
    date
}

/// Current streak ending at (or gracing into) `today`.
///
/// Returns 0 when the latest entry is too old to chain: older than
/// yesterday for daily subjects, or behind the most recent target-day
/// occurrence for weekly ones. Duplicate same-day entries count once.
/// An empty `target_days` set degrades to daily matching.
pub fn current_streak(
    dates: &[NaiveDate],
    frequency: Frequency,
    target_days: &[u8],
    today: NaiveDate,
) -> u32 {
    let target_days: &[u8] = match frequency {
        Frequency::Weekly => target_days,
        Frequency::Daily => &[],
    };

    let mut sorted: Vec<NaiveDate> = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();
    let Some(&latest) = sorted.first() else {
        return 0;
    };

    let recent_enough = if target_days.is_empty() {
        let yesterday = today - Duration::days(1);
        latest == today || latest == yesterday
    } else {
        let previous_target = previous_target_day(today, target_days);
        latest == today
            || (is_target_day(today, target_days) && latest == previous_target)
            || (!is_target_day(today, target_days) && latest >= previous_target)
    };
    if !recent_enough {
        return 0;
    }

    let mut streak = 0;
    let mut expected = latest;
    for &date in &sorted {
        if date == expected {
            streak += 1;
            expected = previous_target_day(expected, target_days);
        } else if date < expected {
            // Gap found, chain ends.
            break;
        }
    }
    streak
}

/// Longest streak ever, from a single ascending scan.
///
/// Consecutive dates (diff of exactly 1 day) extend the run, any larger
/// gap resets it to 1, duplicate same-day entries (diff 0) are ignored.
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.to_vec();
    sorted.sort_unstable();
    if sorted.is_empty() {
        return 0;
    }

    let mut longest = 1u32;
    let mut current = 1u32;
    for pair in sorted.windows(2) {
        match (pair[1] - pair[0]).num_days() {
            0 => {}
            1 => {
                current += 1;
                longest = longest.max(current);
            }
            _ => current = 1,
        }
    }
    longest
}

/// Full derived stats for one subject.
///
/// The completion-rate window starts at the later of the subject's
/// creation date and 30 days ago, so young habits are not penalized for
/// days they did not exist.
pub fn habit_stats(
    dates: &[NaiveDate],
    frequency: Frequency,
    target_days: &[u8],
    created_on: NaiveDate,
    today: NaiveDate,
) -> HabitStats {
    let window_start = created_on.max(today - Duration::days(30));
    let window_days = (today - window_start).num_days().max(1);
    let in_window = dates.iter().filter(|d| **d >= window_start).count();
    let rate = ((in_window as f64 / window_days as f64) * 100.0).round() as u32;

    HabitStats {
        current_streak: current_streak(dates, frequency, target_days, today),
        longest_streak: longest_streak(dates),
        total_completions: dates.len() as u32,
        completion_rate: rate.min(100) as u8,
    }
}
