//! Pomodoro application state: timer, tasks, sessions and daily counters.
//!
//! `PomodoroApp` owns the [`TimerEngine`] and everything a completed
//! interval fans out into: the session log, daily history, task progress
//! and XP. It is a plain state container; callers drive it and persist it
//! through the storage gateway.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::progress::{session_xp, UserProgress};
use crate::stats::{daily_progress, upsert_daily, weekly_data, DailyProgress, DailyStats};
use crate::streak::{current_streak, longest_streak, Frequency};
use crate::timer::{Completion, TimerConfig, TimerEngine, TimerMode};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const MIN_DAILY_GOAL: u32 = 1;
pub const MAX_DAILY_GOAL: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    /// Planned pomodoros, at least 1.
    pub pomodoros_estimate: u32,
    #[serde(default)]
    pub pomodoros_actual: u32,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Immutable record of one finished interval. Appended on completion,
/// never on skip or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSession {
    pub id: Uuid,
    pub mode: TimerMode,
    pub duration_secs: u32,
    pub completed_at: DateTime<Utc>,
    /// Local calendar date the session counts toward.
    pub date: NaiveDate,
    #[serde(default)]
    pub task_id: Option<Uuid>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

fn default_daily_goal() -> u32 {
    8
}

fn default_timer() -> TimerEngine {
    TimerEngine::new(&TimerConfig::default())
}

/// Full pomodoro-side state. Serialized as one JSON snapshot; missing
/// fields default so older snapshots keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PomodoroApp {
    pub version: u32,
    pub config: TimerConfig,
    pub timer: TimerEngine,
    pub tasks: Vec<Task>,
    pub sessions: Vec<PomodoroSession>,
    /// Rolling per-day history, capped and sorted ascending.
    pub daily_stats: Vec<DailyStats>,
    /// Focus sessions completed today; reset by [`check_daily_reset`](Self::check_daily_reset).
    pub daily_pomodoros: u32,
    pub daily_goal: u32,
    pub last_active_date: Option<NaiveDate>,
    pub progress: UserProgress,
}

impl Default for PomodoroApp {
    fn default() -> Self {
        Self {
            version: default_version(),
            config: TimerConfig::default(),
            timer: default_timer(),
            tasks: Vec::new(),
            sessions: Vec::new(),
            daily_stats: Vec::new(),
            daily_pomodoros: 0,
            daily_goal: default_daily_goal(),
            last_active_date: None,
            progress: UserProgress::default(),
        }
    }
}

impl PomodoroApp {
    // ── Timer commands ───────────────────────────────────────────────

    pub fn start_timer(&mut self) -> Option<Event> {
        self.timer.start()
    }

    pub fn pause_timer(&mut self) -> Option<Event> {
        self.timer.pause()
    }

    pub fn reset_timer(&mut self) -> Event {
        self.timer.reset(&self.config)
    }

    pub fn skip_timer(&mut self) -> Event {
        self.timer.skip(&self.config)
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Event {
        self.timer.set_mode(mode, &self.config)
    }

    /// Advance the countdown by one second, folding any completion into
    /// the app state. Returns the completion when one fired.
    pub fn tick(&mut self, today: NaiveDate) -> Option<Completion> {
        let completion = self.timer.tick(&self.config)?;
        self.record_completion(&completion, today);
        Some(completion)
    }

    /// Wall-clock repair after a suspend/reload. A completion that
    /// happened while suspended is recorded exactly once, here.
    pub fn reconcile(&mut self, today: NaiveDate) -> Option<Completion> {
        let completion = self.timer.reconcile(&self.config)?;
        self.record_completion(&completion, today);
        Some(completion)
    }

    #[cfg(test)]
    fn reconcile_at(&mut self, now_epoch_ms: u64, today: NaiveDate) -> Option<Completion> {
        let completion = self.timer.reconcile_at(now_epoch_ms, &self.config)?;
        self.record_completion(&completion, today);
        Some(completion)
    }

    /// Fan a finished interval out into the session log, daily counters,
    /// task progress, streaks and XP. Breaks only log a session.
    fn record_completion(&mut self, completion: &Completion, today: NaiveDate) {
        let task_id = self.timer.current_task_id();
        self.sessions.push(PomodoroSession {
            id: Uuid::new_v4(),
            mode: completion.mode,
            duration_secs: completion.duration_secs,
            completed_at: Utc::now(),
            date: today,
            task_id,
        });

        if completion.mode != TimerMode::Focus {
            return;
        }
        let minutes = completion.duration_secs / 60;

        self.daily_pomodoros += 1;
        let mut task_done = false;
        if let Some(id) = task_id {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                task.pomodoros_actual += 1;
                if !task.completed && task.pomodoros_actual >= task.pomodoros_estimate {
                    task.completed = true;
                    task_done = true;
                }
            }
        }
        upsert_daily(&mut self.daily_stats, today, |e| {
            e.focus_sessions += 1;
            e.total_focus_minutes += minutes;
            if task_done {
                e.tasks_completed += 1;
            }
        });

        self.progress.xp += session_xp(completion.mode, minutes);
        self.progress.total_focus_sessions += 1;
        self.progress.total_focus_minutes += minutes;

        let focus_dates: Vec<NaiveDate> = self
            .sessions
            .iter()
            .filter(|s| s.mode == TimerMode::Focus)
            .map(|s| s.date)
            .collect();
        self.progress.current_streak =
            current_streak(&focus_dates, Frequency::Daily, &[], today);
        self.progress.longest_streak = longest_streak(&focus_dates);
    }

    /// Roll the live daily counter over at the first interaction of a new
    /// day. Idempotent: calling it again on the same date does nothing.
    pub fn check_daily_reset(&mut self, today: NaiveDate) {
        if self.last_active_date == Some(today) {
            return;
        }
        if let Some(previous) = self.last_active_date {
            if self.daily_pomodoros > 0 {
                let count = self.daily_pomodoros;
                upsert_daily(&mut self.daily_stats, previous, |e| {
                    e.focus_sessions = e.focus_sessions.max(count);
                });
            }
        }
        self.daily_pomodoros = 0;
        self.last_active_date = Some(today);
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, title: impl Into<String>, pomodoros_estimate: u32) -> Result<Uuid, CoreError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::invalid("title", "must not be empty").into());
        }
        let task = Task {
            id: Uuid::new_v4(),
            title,
            pomodoros_estimate: pomodoros_estimate.max(1),
            pomodoros_actual: 0,
            completed: false,
            created_at: Utc::now(),
        };
        let id = task.id;
        self.tasks.push(task);
        Ok(id)
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<(), CoreError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| unknown_task(id))?;
        self.tasks.remove(index);
        if self.timer.current_task_id() == Some(id) {
            self.timer.select_task(None);
        }
        Ok(())
    }

    /// Point subsequent focus sessions at a task, or at none.
    pub fn select_task(&mut self, id: Option<Uuid>) -> Result<(), CoreError> {
        if let Some(id) = id {
            if !self.tasks.iter().any(|t| t.id == id) {
                return Err(unknown_task(id));
            }
        }
        self.timer.select_task(id);
        Ok(())
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn set_daily_goal(&mut self, goal: u32) {
        self.daily_goal = goal.clamp(MIN_DAILY_GOAL, MAX_DAILY_GOAL);
    }

    /// Replace the timer configuration, re-clamping it and refreshing the
    /// countdown if the timer is sitting idle.
    pub fn apply_config(&mut self, config: TimerConfig) {
        self.config = config.clamped();
        self.timer.refresh_idle_duration(&self.config);
    }

    // ── Views ────────────────────────────────────────────────────────

    pub fn weekly_data(&self, today: NaiveDate) -> [u32; 7] {
        weekly_data(&self.daily_stats, self.daily_pomodoros, today)
    }

    pub fn daily_progress(&self) -> DailyProgress {
        daily_progress(self.daily_pomodoros, self.daily_goal)
    }

    pub fn today_stats(&self, today: NaiveDate) -> DailyStats {
        self.daily_stats
            .iter()
            .find(|e| e.date == today)
            .copied()
            .unwrap_or_else(|| {
                let mut entry = DailyStats::new(today);
                entry.focus_sessions = self.daily_pomodoros;
                entry
            })
    }

    /// Reset everything to defaults. The caller removes the persisted
    /// snapshot in the same operation.
    pub fn clear_all_data(&mut self) {
        *self = Self::default();
    }
}

fn unknown_task(id: Uuid) -> CoreError {
    ValidationError::UnknownEntity {
        kind: "task",
        id: id.to_string(),
    }
    .into()
}
