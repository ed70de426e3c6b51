//! Timer configuration.
//!
//! Durations are stored in seconds and clamped to `[60, 3600]` at every
//! write boundary; out-of-range input is corrected, never rejected. The
//! state machine reads the config on every transition, so settings changes
//! take effect for the next interval without restarting anything.

use serde::{Deserialize, Serialize};

use super::engine::TimerMode;

pub const MIN_DURATION_SECS: u32 = 60;
pub const MAX_DURATION_SECS: u32 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Focus interval length in seconds.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    #[serde(default = "default_short_break_duration")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break_duration")]
    pub long_break_duration: u32,
    /// Completed focus intervals between long breaks.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_focus: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_focus_duration() -> u32 {
    25 * 60
}
fn default_short_break_duration() -> u32 {
    5 * 60
}
fn default_long_break_duration() -> u32 {
    15 * 60
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: false,
            auto_start_focus: false,
            sound_enabled: true,
        }
    }
}

impl TimerConfig {
    /// Full configured duration for a mode, in seconds.
    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_duration,
            TimerMode::ShortBreak => self.short_break_duration,
            TimerMode::LongBreak => self.long_break_duration,
        }
    }

    pub fn set_duration(&mut self, mode: TimerMode, seconds: u32) {
        let clamped = clamp_duration(seconds);
        match mode {
            TimerMode::Focus => self.focus_duration = clamped,
            TimerMode::ShortBreak => self.short_break_duration = clamped,
            TimerMode::LongBreak => self.long_break_duration = clamped,
        }
    }

    pub fn set_long_break_interval(&mut self, interval: u32) {
        self.long_break_interval = interval.max(1);
    }

    /// Re-apply all clamps. Called after deserializing from an untrusted
    /// snapshot or config file.
    pub fn clamped(mut self) -> Self {
        self.focus_duration = clamp_duration(self.focus_duration);
        self.short_break_duration = clamp_duration(self.short_break_duration);
        self.long_break_duration = clamp_duration(self.long_break_duration);
        self.long_break_interval = self.long_break_interval.max(1);
        self
    }
}

pub fn clamp_duration(seconds: u32) -> u32 {
    seconds.clamp(MIN_DURATION_SECS, MAX_DURATION_SECS)
}
