//! Rolling aggregate views derived from the event logs.
//!
//! These feed chart rendering and must tolerate gaps: a day with no
//! history entry simply reads as zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{last_n_days, week_dates};

/// Daily history is a sliding window; the oldest entries are evicted.
pub const HISTORY_CAP: usize = 30;

/// Date-keyed daily aggregate. One entry per calendar date, upserted on
/// session completion and capped to [`HISTORY_CAP`] entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    #[serde(default)]
    pub focus_sessions: u32,
    #[serde(default)]
    pub total_focus_minutes: u32,
    #[serde(default)]
    pub tasks_completed: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            focus_sessions: 0,
            total_focus_minutes: 0,
            tasks_completed: 0,
        }
    }
}

/// Upsert the entry for `date`, then evict the oldest entries beyond the
/// cap. History stays sorted ascending by date.
pub fn upsert_daily<F>(history: &mut Vec<DailyStats>, date: NaiveDate, apply: F)
where
    F: FnOnce(&mut DailyStats),
{
    if let Some(entry) = history.iter_mut().find(|e| e.date == date) {
        apply(entry);
        return;
    }
    let mut entry = DailyStats::new(date);
    apply(&mut entry);
    history.push(entry);
    history.sort_unstable_by_key(|e| e.date);
    if history.len() > HISTORY_CAP {
        let excess = history.len() - HISTORY_CAP;
        history.drain(..excess);
    }
}

/// Last 7 days of focus-session counts, oldest first, ending `today`.
/// Today reads from the live counter; prior days come from history.
pub fn weekly_data(history: &[DailyStats], today_count: u32, today: NaiveDate) -> [u32; 7] {
    let days = last_n_days(today, 7);
    std::array::from_fn(|i| {
        let date = days[i];
        if date == today {
            today_count
        } else {
            history
                .iter()
                .find(|e| e.date == date)
                .map(|e| e.focus_sessions)
                .unwrap_or(0)
        }
    })
}

/// Progress toward the daily pomodoro goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub current: u32,
    pub goal: u32,
    pub percentage: u8,
}

pub fn daily_progress(current: u32, goal: u32) -> DailyProgress {
    let percentage = if goal == 0 {
        0
    } else {
        ((f64::from(current) / f64::from(goal)) * 100.0)
            .round()
            .min(100.0) as u8
    };
    DailyProgress {
        current,
        goal,
        percentage,
    }
}

/// Completion marks over the current Sunday-started week, one flag per
/// weekday, for the habit statistics screen.
pub fn week_completion(dates: &[NaiveDate], today: NaiveDate) -> [bool; 7] {
    let week = week_dates(today);
    std::array::from_fn(|i| dates.contains(&week[i]))
}
