//! # Habitflow Core Library
//!
//! Core business logic for the habitflow focus timer and habit tracker.
//! All state lives in two explicit containers, [`PomodoroApp`] and
//! [`HabitApp`], driven synchronously by their callers; the CLI binary is
//! a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates
//! - **Streaks & Progress**: Pure functions deriving streaks, statistics
//!   and XP from append-only logs
//! - **Storage**: JSON snapshot persistence behind the [`SnapshotStore`]
//!   trait, plus TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`PomodoroApp`]: Timer, tasks, sessions and daily counters
//! - [`HabitApp`]: Habits, check-ins and streak freezes
//! - [`Config`]: Application configuration management

pub mod date;
pub mod error;
pub mod events;
pub mod habits;
pub mod pomodoro;
pub mod progress;
pub mod reminders;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use habits::{CheckIn, CheckInOutcome, Habit, HabitApp, HabitUpdate, HabitWithStatus, NewHabit};
pub use pomodoro::{PomodoroApp, PomodoroSession, Task};
pub use progress::{HabitProgress, UserProgress, XpProgress};
pub use reminders::{NoopScheduler, ReminderScheduler};
pub use stats::{DailyProgress, DailyStats};
pub use storage::{Config, JsonFileStore, MemoryStore, SnapshotStore};
pub use streak::{Frequency, HabitStats};
pub use timer::{Completion, TimerConfig, TimerEngine, TimerMode, TimerStatus};
