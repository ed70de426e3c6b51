//! Habit tracking state: habits, check-ins, streak freezes and XP.
//!
//! `HabitApp` is the explicit state container for the habit tracker. All
//! mutations are synchronous state transforms; persistence and reminder
//! scheduling are injected at the call sites, never reached for from
//! module-level globals. Check-ins are append-only: toggling an existing
//! check-in removes it instead of duplicating, so at most one entry exists
//! per (habit, date).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};
use crate::progress::{check_in_xp, HabitProgress, FREEZE_EARN_INTERVAL};
use crate::reminders::ReminderScheduler;
use crate::stats::week_completion;
use crate::streak::{current_streak, habit_stats, Frequency, HabitStats};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub frequency: Frequency,
    /// Weekday indices (0 = Sunday). Non-empty for weekly habits; an empty
    /// set degrades to daily matching in the streak engine.
    #[serde(default)]
    pub target_days: Vec<u8>,
    /// "HH:mm" local time.
    #[serde(default)]
    pub reminder_time: Option<String>,
    /// Opaque schedule handle from the reminder collaborator.
    #[serde(default)]
    pub notification_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// Append-only check-in log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

/// A habit joined with its derived per-day status for list views.
#[derive(Debug, Clone, Serialize)]
pub struct HabitWithStatus {
    #[serde(flatten)]
    pub habit: Habit,
    pub completed_today: bool,
    pub streak: u32,
    pub stats: HabitStats,
    /// Completion marks over the current Sunday-started week.
    pub week_completion: [bool; 7],
}

/// Fields accepted when creating a habit.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub color: String,
    pub frequency: Frequency,
    pub target_days: Vec<u8>,
    pub reminder_time: Option<String>,
}

/// Partial update; `None` leaves the field alone. `reminder_time` is
/// doubly optional so it can be cleared.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub frequency: Option<Frequency>,
    pub target_days: Option<Vec<u8>>,
    pub reminder_time: Option<Option<String>>,
}

/// Result of toggling today's check-in.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckInOutcome {
    Added {
        streak: u32,
        xp_gained: u32,
        freeze_earned: bool,
    },
    Removed,
}

/// Full habit-tracker state. Serialized as one JSON snapshot; unknown or
/// missing fields default rather than error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitApp {
    pub version: u32,
    pub habits: Vec<Habit>,
    pub check_ins: Vec<CheckIn>,
    pub progress: HabitProgress,
    pub user_name: String,
}

impl Default for HabitApp {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            habits: Vec::new(),
            check_ins: Vec::new(),
            progress: HabitProgress::default(),
            user_name: "User".to_string(),
        }
    }
}

impl HabitApp {
    // ── Habit lifecycle ──────────────────────────────────────────────

    pub fn add_habit(
        &mut self,
        new: NewHabit,
        scheduler: &mut dyn ReminderScheduler,
    ) -> Result<Uuid, CoreError> {
        validate_habit_fields(&new.name, new.frequency, &new.target_days, new.reminder_time.as_deref())?;

        let mut habit = Habit {
            id: Uuid::new_v4(),
            name: new.name,
            color: new.color,
            frequency: new.frequency,
            target_days: new.target_days,
            reminder_time: new.reminder_time,
            notification_id: None,
            archived: false,
            created_at: Utc::now(),
        };
        if let Some(time) = habit.reminder_time.clone() {
            habit.notification_id = Some(scheduler.schedule(habit.id, &habit.name, &time)?);
        }
        let id = habit.id;
        self.habits.push(habit);
        Ok(id)
    }

    pub fn update_habit(
        &mut self,
        id: Uuid,
        updates: HabitUpdate,
        scheduler: &mut dyn ReminderScheduler,
    ) -> Result<(), CoreError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| unknown_habit(id))?;

        let name = updates.name.unwrap_or_else(|| habit.name.clone());
        let frequency = updates.frequency.unwrap_or(habit.frequency);
        let target_days = updates.target_days.unwrap_or_else(|| habit.target_days.clone());
        let reminder_time = updates
            .reminder_time
            .unwrap_or_else(|| habit.reminder_time.clone());
        validate_habit_fields(&name, frequency, &target_days, reminder_time.as_deref())?;

        // Cancel the old schedule before anything changes under it.
        if let Some(handle) = habit.notification_id.take() {
            scheduler.cancel(&handle)?;
        }

        habit.name = name;
        habit.frequency = frequency;
        habit.target_days = target_days;
        habit.reminder_time = reminder_time;
        if let Some(color) = updates.color {
            habit.color = color;
        }
        if !habit.archived {
            if let Some(time) = habit.reminder_time.clone() {
                habit.notification_id = Some(scheduler.schedule(habit.id, &habit.name, &time)?);
            }
        }
        Ok(())
    }

    /// Delete a habit and cascade-remove its check-in history. The
    /// reminder is canceled in the same update, so no orphaned handle or
    /// log entry survives.
    pub fn delete_habit(
        &mut self,
        id: Uuid,
        scheduler: &mut dyn ReminderScheduler,
    ) -> Result<(), CoreError> {
        let index = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| unknown_habit(id))?;
        if let Some(handle) = self.habits[index].notification_id.take() {
            scheduler.cancel(&handle)?;
        }
        self.habits.remove(index);
        self.check_ins.retain(|c| c.habit_id != id);
        Ok(())
    }

    /// Soft delete: hidden from active views and the reminder is canceled,
    /// but check-in history is retained.
    pub fn archive_habit(
        &mut self,
        id: Uuid,
        scheduler: &mut dyn ReminderScheduler,
    ) -> Result<(), CoreError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| unknown_habit(id))?;
        if let Some(handle) = habit.notification_id.take() {
            scheduler.cancel(&handle)?;
        }
        habit.archived = true;
        Ok(())
    }

    pub fn unarchive_habit(
        &mut self,
        id: Uuid,
        scheduler: &mut dyn ReminderScheduler,
    ) -> Result<(), CoreError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| unknown_habit(id))?;
        habit.archived = false;
        if let Some(time) = habit.reminder_time.clone() {
            habit.notification_id = Some(scheduler.schedule(habit.id, &habit.name, &time)?);
        }
        Ok(())
    }

    // ── Check-ins ────────────────────────────────────────────────────

    /// Toggle today's check-in. Adding one awards XP scaled by the
    /// resulting streak and may earn a streak-freeze credit; removing one
    /// does not claw anything back.
    pub fn toggle_check_in(
        &mut self,
        habit_id: Uuid,
        today: NaiveDate,
    ) -> Result<CheckInOutcome, CoreError> {
        let habit = self
            .habits
            .iter()
            .find(|h| h.id == habit_id)
            .ok_or_else(|| unknown_habit(habit_id))?
            .clone();

        if self.is_completed_on(habit_id, today) {
            self.check_ins
                .retain(|c| !(c.habit_id == habit_id && c.date == today));
            return Ok(CheckInOutcome::Removed);
        }

        self.check_ins.push(CheckIn {
            habit_id,
            date: today,
            completed_at: Utc::now(),
        });

        let streak = current_streak(
            &self.habit_dates(habit_id),
            habit.frequency,
            &habit.target_days,
            today,
        );
        let xp_gained = check_in_xp(streak);
        let freeze_earned = streak > 0 && streak % FREEZE_EARN_INTERVAL == 0;

        self.progress.xp += xp_gained;
        if freeze_earned {
            self.progress.streak_freezes += 1;
        }

        Ok(CheckInOutcome::Added {
            streak,
            xp_gained,
            freeze_earned,
        })
    }

    pub fn is_completed_on(&self, habit_id: Uuid, date: NaiveDate) -> bool {
        self.check_ins
            .iter()
            .any(|c| c.habit_id == habit_id && c.date == date)
    }

    /// All check-in dates for one habit, unsorted.
    pub fn habit_dates(&self, habit_id: Uuid) -> Vec<NaiveDate> {
        self.check_ins
            .iter()
            .filter(|c| c.habit_id == habit_id)
            .map(|c| c.date)
            .collect()
    }

    // ── Streak freezes ───────────────────────────────────────────────

    /// A freeze is usable only when there is an actual streak worth
    /// rescuing: balance available, yesterday missed, today still open,
    /// and backfilling yesterday would yield a streak of at least 2.
    pub fn can_use_streak_freeze(&self, habit_id: Uuid, today: NaiveDate) -> bool {
        if self.progress.streak_freezes == 0 {
            return false;
        }
        let Some(habit) = self.habits.iter().find(|h| h.id == habit_id) else {
            return false;
        };
        let yesterday = today - chrono::Duration::days(1);
        if self.is_completed_on(habit_id, yesterday) || self.is_completed_on(habit_id, today) {
            return false;
        }

        let mut simulated = self.habit_dates(habit_id);
        simulated.push(yesterday);
        let potential = current_streak(&simulated, habit.frequency, &habit.target_days, today);
        potential >= 2
    }

    /// Consume one freeze credit by synthesizing a backdated check-in for
    /// yesterday. This is the only place a check-in is created without a
    /// user action. Returns false when ineligible.
    pub fn use_streak_freeze(&mut self, habit_id: Uuid, today: NaiveDate) -> bool {
        if !self.can_use_streak_freeze(habit_id, today) {
            return false;
        }
        self.check_ins.push(CheckIn {
            habit_id,
            date: today - chrono::Duration::days(1),
            completed_at: Utc::now(),
        });
        self.progress.streak_freezes -= 1;
        true
    }

    // ── Views ────────────────────────────────────────────────────────

    pub fn active_habits(&self, today: NaiveDate) -> Vec<HabitWithStatus> {
        self.habits
            .iter()
            .filter(|h| !h.archived)
            .map(|h| self.habit_status(h, today))
            .collect()
    }

    pub fn archived_habits(&self, today: NaiveDate) -> Vec<HabitWithStatus> {
        self.habits
            .iter()
            .filter(|h| h.archived)
            .map(|h| self.habit_status(h, today))
            .collect()
    }

    pub fn habit_status(&self, habit: &Habit, today: NaiveDate) -> HabitWithStatus {
        let dates = self.habit_dates(habit.id);
        let streak = current_streak(&dates, habit.frequency, &habit.target_days, today);
        let stats = habit_stats(
            &dates,
            habit.frequency,
            &habit.target_days,
            habit.created_on(),
            today,
        );
        HabitWithStatus {
            habit: habit.clone(),
            completed_today: dates.contains(&today),
            streak,
            stats,
            week_completion: week_completion(&dates, today),
        }
    }

    pub fn stats_for(&self, habit_id: Uuid, today: NaiveDate) -> Result<HabitStats, CoreError> {
        let habit = self
            .habits
            .iter()
            .find(|h| h.id == habit_id)
            .ok_or_else(|| unknown_habit(habit_id))?;
        Ok(self.habit_status(habit, today).stats)
    }

    // ── Misc ─────────────────────────────────────────────────────────

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.user_name = name.into();
    }

    /// Reset every structure to defaults. The caller removes the persisted
    /// snapshot in the same operation.
    pub fn clear_all_data(&mut self) {
        *self = Self::default();
    }
}

fn validate_habit_fields(
    name: &str,
    frequency: Frequency,
    target_days: &[u8],
    reminder_time: Option<&str>,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::invalid("name", "must not be empty"));
    }
    if frequency == Frequency::Weekly && target_days.is_empty() {
        return Err(ValidationError::invalid(
            "target_days",
            "weekly habits need at least one target day",
        ));
    }
    if let Some(day) = target_days.iter().find(|d| **d > 6) {
        return Err(ValidationError::invalid(
            "target_days",
            format!("weekday index {day} out of range 0-6"),
        ));
    }
    if let Some(time) = reminder_time {
        NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| ValidationError::invalid("reminder_time", format!("'{time}' is not HH:mm")))?;
    }
    Ok(())
}

fn unknown_habit(id: Uuid) -> CoreError {
    ValidationError::UnknownEntity {
        kind: "habit",
        id: id.to_string(),
    }
    .into()
}
