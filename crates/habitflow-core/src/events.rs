use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerStatus};

/// Every timer state change produces an Event.
/// The presentation layer polls for these; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from_mode: TimerMode,
        to_mode: TimerMode,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        status: TimerStatus,
        remaining_seconds: u32,
        total_seconds: u32,
        completed_focus_sessions: u32,
        at: DateTime<Utc>,
    },
}
