//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller drives it by calling `tick()` roughly once
//! per second and `reconcile()` on app-foreground.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Completed) -> Running -> ...
//! ```
//!
//! Tick delivery is not guaranteed while the process is suspended, so a
//! wall-clock anchor is captured whenever the engine enters `Running` and
//! `remaining_seconds` is re-derived from it on every transition away from
//! running. A timer that conceptually finished while suspended is surfaced
//! as a completion on the next `reconcile()`, never left stuck at 0.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::TimerConfig;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Wall-clock anchor captured when the engine enters `Running`.
///
/// `remaining_at_start` is authoritative: elapsed wall-clock time is
/// subtracted from it on pause/reconcile instead of trusting however many
/// ticks happened to be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAnchor {
    pub started_at_epoch_ms: u64,
    pub remaining_at_start: u32,
}

impl RunAnchor {
    fn elapsed_secs(&self, now_epoch_ms: u64) -> u32 {
        let elapsed_ms = now_epoch_ms.saturating_sub(self.started_at_epoch_ms);
        u32::try_from(elapsed_ms / 1000).unwrap_or(u32::MAX)
    }

    fn remaining_at(&self, now_epoch_ms: u64) -> u32 {
        self.remaining_at_start
            .saturating_sub(self.elapsed_secs(now_epoch_ms))
    }
}

/// What happened when an interval ran to completion.
///
/// The engine only advances its own state; the owning app state turns a
/// `Completion` into a session record, daily counters and XP. Skips never
/// produce one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The interval that finished.
    pub mode: TimerMode,
    /// Its configured full duration in seconds.
    pub duration_secs: u32,
    pub next_mode: TimerMode,
    pub auto_started: bool,
}

/// Core timer state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: TimerMode,
    status: TimerStatus,
    /// Remaining time in seconds for the current interval.
    remaining_seconds: u32,
    /// Completed focus intervals within the current long-break cycle.
    /// Resets to 0 when a long break is entered.
    completed_focus_sessions: u32,
    #[serde(default)]
    current_task_id: Option<Uuid>,
    #[serde(default)]
    anchor: Option<RunAnchor>,
}

impl TimerEngine {
    /// Create a new engine, idle at the start of a focus interval.
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            mode: TimerMode::Focus,
            status: TimerStatus::Idle,
            remaining_seconds: config.focus_duration,
            completed_focus_sessions: 0,
            current_task_id: None,
            anchor: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn completed_focus_sessions(&self) -> u32 {
        self.completed_focus_sessions
    }

    pub fn current_task_id(&self) -> Option<Uuid> {
        self.current_task_id
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, config: &TimerConfig) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            status: self.status,
            remaining_seconds: self.remaining_seconds,
            total_seconds: config.duration_for(self.mode),
            completed_focus_sessions: self.completed_focus_sessions,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    /// Deterministic variant of [`start`](Self::start) with an explicit
    /// wall clock, used by the reconciliation path and tests.
    pub fn start_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused | TimerStatus::Completed => {
                self.status = TimerStatus::Running;
                self.anchor = Some(RunAnchor {
                    started_at_epoch_ms: now_epoch_ms,
                    remaining_at_start: self.remaining_seconds,
                });
                Some(Event::TimerStarted {
                    mode: self.mode,
                    remaining_seconds: self.remaining_seconds,
                    at: Utc::now(),
                })
            }
            TimerStatus::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// Deterministic variant of [`pause`](Self::pause).
    pub fn pause_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        if let Some(anchor) = self.anchor.take() {
            self.remaining_seconds = anchor.remaining_at(now_epoch_ms);
        }
        self.status = TimerStatus::Paused;
        Some(Event::TimerPaused {
            remaining_seconds: self.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Back to idle at the current mode's full duration. Counts untouched.
    pub fn reset(&mut self, config: &TimerConfig) -> Event {
        self.status = TimerStatus::Idle;
        self.anchor = None;
        self.remaining_seconds = config.duration_for(self.mode);
        Event::TimerReset {
            mode: self.mode,
            at: Utc::now(),
        }
    }

    /// Call roughly once per second while the app is foregrounded.
    ///
    /// No-op unless running. Decrements the countdown; the tick that
    /// reaches 0 triggers completion and returns it.
    pub fn tick(&mut self, config: &TimerConfig) -> Option<Completion> {
        if self.status != TimerStatus::Running {
            return None;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        if self.remaining_seconds == 0 {
            return Some(self.complete(config));
        }
        None
    }

    /// Suspend/resume repair: recompute the countdown from the wall clock.
    ///
    /// Returns the completion if the interval finished while the process
    /// was suspended.
    pub fn reconcile(&mut self, config: &TimerConfig) -> Option<Completion> {
        self.reconcile_at(now_ms(), config)
    }

    /// Deterministic variant of [`reconcile`](Self::reconcile).
    pub fn reconcile_at(&mut self, now_epoch_ms: u64, config: &TimerConfig) -> Option<Completion> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let anchor = self.anchor?;
        let remaining = anchor.remaining_at(now_epoch_ms);
        if remaining == 0 {
            self.remaining_seconds = 0;
            return Some(self.complete_at(now_epoch_ms, config));
        }
        self.remaining_seconds = remaining;
        self.anchor = Some(RunAnchor {
            started_at_epoch_ms: now_epoch_ms,
            remaining_at_start: remaining,
        });
        None
    }

    /// Force-advance to the next mode WITHOUT counting the current interval.
    ///
    /// Skipping focus does not bump `completed_focus_sessions` or any daily
    /// counter; skipping a break still legally returns to focus. Only
    /// genuinely finished focus work counts toward goals and XP.
    pub fn skip(&mut self, config: &TimerConfig) -> Event {
        let from = self.mode;
        let next = next_mode(self.mode, self.completed_focus_sessions, config);
        if next == TimerMode::LongBreak {
            self.completed_focus_sessions = 0;
        }
        self.mode = next;
        self.status = TimerStatus::Idle;
        self.anchor = None;
        self.remaining_seconds = config.duration_for(next);
        Event::TimerSkipped {
            from_mode: from,
            to_mode: next,
            at: Utc::now(),
        }
    }

    /// Manual mode switch from the mode selector. Lands idle.
    pub fn set_mode(&mut self, mode: TimerMode, config: &TimerConfig) -> Event {
        self.mode = mode;
        self.status = TimerStatus::Idle;
        self.anchor = None;
        self.remaining_seconds = config.duration_for(mode);
        Event::ModeSwitched {
            mode,
            at: Utc::now(),
        }
    }

    /// Re-read the configured duration while idle, after a settings change.
    pub fn refresh_idle_duration(&mut self, config: &TimerConfig) {
        if self.status == TimerStatus::Idle {
            self.remaining_seconds = config.duration_for(self.mode);
        }
    }

    pub fn select_task(&mut self, task_id: Option<Uuid>) {
        self.current_task_id = task_id;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, config: &TimerConfig) -> Completion {
        self.complete_at(now_ms(), config)
    }

    fn complete_at(&mut self, now_epoch_ms: u64, config: &TimerConfig) -> Completion {
        let finished = self.mode;
        let duration_secs = config.duration_for(finished);
        let next = next_mode(finished, self.completed_focus_sessions, config);
        if finished == TimerMode::Focus {
            self.completed_focus_sessions = if next == TimerMode::LongBreak {
                0
            } else {
                self.completed_focus_sessions + 1
            };
        }
        let auto_started = if next == TimerMode::Focus {
            config.auto_start_focus
        } else {
            config.auto_start_breaks
        };
        self.mode = next;
        self.remaining_seconds = config.duration_for(next);
        if auto_started {
            self.status = TimerStatus::Running;
            self.anchor = Some(RunAnchor {
                started_at_epoch_ms: now_epoch_ms,
                remaining_at_start: self.remaining_seconds,
            });
        } else {
            self.status = TimerStatus::Idle;
            self.anchor = None;
        }
        Completion {
            mode: finished,
            duration_secs,
            next_mode: next,
            auto_started,
        }
    }
}

/// Transition rule: from focus, every `long_break_interval`-th completion
/// routes to the long break; any break returns to focus.
pub fn next_mode(current: TimerMode, completed_focus_sessions: u32, config: &TimerConfig) -> TimerMode {
    match current {
        TimerMode::Focus => {
            if (completed_focus_sessions + 1) % config.long_break_interval.max(1) == 0 {
                TimerMode::LongBreak
            } else {
                TimerMode::ShortBreak
            }
        }
        TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> TimerConfig {
        TimerConfig::default()
    }

    #[test]
    fn start_pause_resume() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        assert_eq!(engine.status(), TimerStatus::Idle);

        assert!(engine.start().is_some());
        assert_eq!(engine.status(), TimerStatus::Running);
        // Starting again is a no-op.
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert_eq!(engine.status(), TimerStatus::Paused);

        assert!(engine.start().is_some());
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn pause_subtracts_wall_clock_not_ticks() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.start_at(0);
        assert_eq!(engine.remaining_seconds(), 1500);

        // 10s of wall clock pass; only 3 ticks were delivered.
        engine.tick(&config);
        engine.tick(&config);
        engine.tick(&config);
        engine.pause_at(10_000);
        assert_eq!(engine.status(), TimerStatus::Paused);
        assert_eq!(engine.remaining_seconds(), 1490);

        // Resume, another 5s of wall clock.
        engine.start_at(10_000);
        engine.pause_at(15_000);
        assert_eq!(engine.remaining_seconds(), 1485);
    }

    #[test]
    fn tick_counts_down_and_completes_at_zero() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.start();
        for _ in 0..1499 {
            assert!(engine.tick(&config).is_none());
        }
        let completion = engine.tick(&config).expect("final tick completes");
        assert_eq!(completion.mode, TimerMode::Focus);
        assert_eq!(completion.next_mode, TimerMode::ShortBreak);
        assert!(!completion.auto_started);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.remaining_seconds(), 300);
        assert_eq!(engine.completed_focus_sessions(), 1);
    }

    #[test]
    fn tick_is_noop_unless_running() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        assert!(engine.tick(&config).is_none());
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn fourth_focus_completion_routes_to_long_break() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        for round in 1..=4u32 {
            engine.start();
            let completion = run_to_completion(&mut engine, &config);
            if round == 4 {
                assert_eq!(completion.next_mode, TimerMode::LongBreak);
                assert_eq!(engine.completed_focus_sessions(), 0);
            } else {
                assert_eq!(completion.next_mode, TimerMode::ShortBreak);
                assert_eq!(engine.completed_focus_sessions(), round);
            }
            // Finish the break to get back to focus.
            engine.start();
            let brk = run_to_completion(&mut engine, &config);
            assert_eq!(brk.next_mode, TimerMode::Focus);
        }
    }

    #[test]
    fn skip_focus_does_not_count() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.skip(&config);
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.completed_focus_sessions(), 0);

        engine.skip(&config);
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn auto_start_enters_running_with_fresh_anchor() {
        let mut config = cfg();
        config.auto_start_breaks = true;
        let mut engine = TimerEngine::new(&config);
        engine.start();
        let completion = run_to_completion(&mut engine, &config);
        assert!(completion.auto_started);
        assert_eq!(engine.status(), TimerStatus::Running);
        assert_eq!(engine.remaining_seconds(), 300);
    }

    #[test]
    fn reconcile_repairs_countdown_after_suspension() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.start_at(0);
        // 100s suspended, no ticks delivered.
        assert!(engine.reconcile_at(100_000, &config).is_none());
        assert_eq!(engine.remaining_seconds(), 1400);
    }

    #[test]
    fn reconcile_surfaces_completion_that_happened_while_suspended() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.start_at(0);
        let completion = engine
            .reconcile_at(2_000_000, &config)
            .expect("finished while suspended");
        assert_eq!(completion.mode, TimerMode::Focus);
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn reset_restores_full_duration_without_touching_counts() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.start();
        run_to_completion(&mut engine, &config);
        assert_eq!(engine.completed_focus_sessions(), 1);

        engine.start();
        engine.tick(&config);
        engine.reset(&config);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_seconds(), 300);
        assert_eq!(engine.completed_focus_sessions(), 1);
    }

    #[test]
    fn set_mode_lands_idle_at_full_duration() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.start();
        engine.set_mode(TimerMode::LongBreak, &config);
        assert_eq!(engine.mode(), TimerMode::LongBreak);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_seconds(), 900);
    }

    #[test]
    fn engine_state_survives_serialization() {
        let config = cfg();
        let mut engine = TimerEngine::new(&config);
        engine.start_at(0);
        engine.tick(&config);
        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.status(), TimerStatus::Running);
        assert_eq!(restored.remaining_seconds(), engine.remaining_seconds());
        // The anchor survives, so reconcile still works after a reload.
        let mut restored = restored;
        assert!(restored.reconcile_at(100_000, &config).is_none());
        assert_eq!(restored.remaining_seconds(), 1400);
    }

    fn run_to_completion(engine: &mut TimerEngine, config: &TimerConfig) -> Completion {
        for _ in 0..MAX_DURATION_TICKS {
            if let Some(completion) = engine.tick(config) {
                return completion;
            }
        }
        panic!("interval never completed");
    }

    const MAX_DURATION_TICKS: u32 = 4000;
}
