//! Reminder scheduling boundary.
//!
//! The core never talks to a notification service. It hands `(habit id,
//! name, reminder time)` to a [`ReminderScheduler`] and keeps only the
//! opaque handle that comes back, so the reminder can be canceled when the
//! habit is deleted, edited or archived.

use uuid::Uuid;

use crate::error::CoreError;

pub trait ReminderScheduler {
    /// Schedule a recurring reminder; returns an opaque handle.
    fn schedule(
        &mut self,
        habit_id: Uuid,
        name: &str,
        reminder_time: &str,
    ) -> Result<String, CoreError>;

    /// Cancel a previously scheduled reminder.
    fn cancel(&mut self, handle: &str) -> Result<(), CoreError>;
}

/// Scheduler that schedules nothing. Used by the CLI composition and in
/// tests that don't care about reminders.
#[derive(Debug, Default)]
pub struct NoopScheduler;

impl ReminderScheduler for NoopScheduler {
    fn schedule(
        &mut self,
        habit_id: Uuid,
        _name: &str,
        reminder_time: &str,
    ) -> Result<String, CoreError> {
        Ok(format!("noop:{habit_id}:{reminder_time}"))
    }

    fn cancel(&mut self, _handle: &str) -> Result<(), CoreError> {
        Ok(())
    }
}
