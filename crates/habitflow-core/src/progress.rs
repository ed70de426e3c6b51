//! XP and leveling.
//!
//! Levels have triangular-number widths: advancing from level L to L+1
//! costs `L * 100` XP, so level 1->2 costs 100, 2->3 costs 200, and so on.
//! Both `level_for_xp` and `xp_progress` run the same accumulation loop
//! rather than a closed form, so the level and the progress bar can never
//! disagree on rounding.

use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

pub const CHECK_IN_BASE_XP: u32 = 10;
pub const STREAK_BONUS_CAP: u32 = 50;
/// A streak-freeze credit is granted every time a real check-in lands the
/// streak on a multiple of this.
pub const FREEZE_EARN_INTERVAL: u32 = 7;

/// XP awarded for a habit check-in: a flat base plus a streak bonus that
/// caps out so very long streaks don't dominate leveling.
pub fn check_in_xp(streak: u32) -> u32 {
    CHECK_IN_BASE_XP + (streak * 2).min(STREAK_BONUS_CAP)
}

/// XP awarded for a completed timer interval. Breaks earn a token amount;
/// focus sessions earn the base plus a duration bonus.
pub fn session_xp(mode: TimerMode, duration_minutes: u32) -> u32 {
    let base = if mode.is_break() { 2 } else { 10 };
    base + duration_minutes / 5
}

/// Level reached at `xp`, starting from level 1 at 0 XP.
pub fn level_for_xp(xp: u32) -> u32 {
    let mut level = 1u32;
    let mut floor = 0u64;
    while u64::from(xp) >= floor + u64::from(level) * 100 {
        floor += u64::from(level) * 100;
        level += 1;
    }
    level
}

/// Progress within the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpProgress {
    /// XP earned inside the current level.
    pub current: u32,
    /// XP needed to finish the current level.
    pub required: u32,
    pub percentage: u8,
}

pub fn xp_progress(xp: u32) -> XpProgress {
    let mut level = 1u32;
    let mut floor = 0u64;
    while u64::from(xp) >= floor + u64::from(level) * 100 {
        floor += u64::from(level) * 100;
        level += 1;
    }
    let current = (u64::from(xp) - floor) as u32;
    let required = level * 100;
    XpProgress {
        current,
        required,
        percentage: ((f64::from(current) / f64::from(required)) * 100.0).round() as u8,
    }
}

/// Pomodoro-side gamification state. `level` is a pure projection of `xp`
/// and is recomputed on every read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserProgress {
    pub xp: u32,
    pub total_focus_sessions: u32,
    pub total_focus_minutes: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl UserProgress {
    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    pub fn xp_progress(&self) -> XpProgress {
        xp_progress(self.xp)
    }
}

/// Habit-side gamification state. Starts with one free streak freeze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitProgress {
    pub xp: u32,
    pub streak_freezes: u32,
}

impl Default for HabitProgress {
    fn default() -> Self {
        Self {
            xp: 0,
            streak_freezes: 1,
        }
    }
}

impl HabitProgress {
    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    pub fn xp_progress(&self) -> XpProgress {
        xp_progress(self.xp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn check_in_xp_bonus_caps_at_50() {
        assert_eq!(check_in_xp(0), 10);
        assert_eq!(check_in_xp(3), 16);
        assert_eq!(check_in_xp(25), 60);
        assert_eq!(check_in_xp(500), 60);
    }

    #[test]
    fn session_xp_rewards_focus_over_breaks() {
        assert_eq!(session_xp(TimerMode::Focus, 25), 15);
        assert_eq!(session_xp(TimerMode::ShortBreak, 5), 3);
        assert_eq!(session_xp(TimerMode::LongBreak, 15), 5);
    }

    #[test]
    fn level_thresholds_are_triangular() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(299), 2);
        assert_eq!(level_for_xp(300), 3);
        assert_eq!(level_for_xp(599), 3);
        assert_eq!(level_for_xp(600), 4);
    }

    #[test]
    fn xp_progress_matches_level_boundaries() {
        let p = xp_progress(0);
        assert_eq!((p.current, p.required, p.percentage), (0, 100, 0));

        let p = xp_progress(150);
        assert_eq!((p.current, p.required), (50, 200));
        assert_eq!(p.percentage, 25);

        let p = xp_progress(300);
        assert_eq!((p.current, p.required, p.percentage), (0, 300, 0));
    }

    #[test]
    fn xp_progress_survives_maximum_xp() {
        // The accumulation must not overflow u32 arithmetic near the top
        // of the range, and it must stay in lockstep with level_for_xp.
        let xp = u32::MAX;
        let p = xp_progress(xp);
        let level = level_for_xp(xp);
        assert_eq!(p.required, level * 100);
        assert!(p.current < p.required);
        let floor: u64 = (1..u64::from(level)).map(|i| i * 100).sum();
        assert_eq!(u64::from(p.current) + floor, u64::from(xp));
    }

    #[test]
    fn habit_progress_starts_with_one_freeze() {
        assert_eq!(HabitProgress::default().streak_freezes, 1);
    }

    #[test]
    fn level_is_a_projection_of_xp() {
        let progress = UserProgress {
            xp: 450,
            ..UserProgress::default()
        };
        assert_eq!(progress.level(), 3);
    }

    proptest! {
        #[test]
        fn level_is_monotonic_in_xp(a in 0u32..2_000_000, b in 0u32..2_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for_xp(lo) <= level_for_xp(hi));
        }

        #[test]
        fn progress_accounts_for_every_xp_point(xp in 0u32..2_000_000) {
            let level = level_for_xp(xp);
            let floor: u32 = (1..level).map(|i| i * 100).sum();
            prop_assert_eq!(xp_progress(xp).current + floor, xp);
        }

        #[test]
        fn progress_and_level_use_the_same_formula(xp in 0u32..2_000_000) {
            let p = xp_progress(xp);
            prop_assert_eq!(p.required, level_for_xp(xp) * 100);
            prop_assert!(p.current < p.required);
        }
    }
}
