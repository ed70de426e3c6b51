mod config;
mod engine;

pub use config::{clamp_duration, TimerConfig, MAX_DURATION_SECS, MIN_DURATION_SECS};
pub use engine::{next_mode, Completion, RunAnchor, TimerEngine, TimerMode, TimerStatus};
