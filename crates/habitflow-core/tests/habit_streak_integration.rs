//! Habit lifecycle scenarios: streaks building day over day, weekly target
//! schedules, streak-freeze rescue and XP accrual through the public API.

use chrono::{Duration, NaiveDate};
use habitflow_core::{
    CheckInOutcome, Frequency, HabitApp, NewHabit, NoopScheduler,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn add_daily(app: &mut HabitApp, name: &str) -> uuid::Uuid {
    app.add_habit(
        NewHabit {
            name: name.to_string(),
            color: "#22c55e".to_string(),
            frequency: Frequency::Daily,
            target_days: Vec::new(),
            reminder_time: None,
        },
        &mut NoopScheduler,
    )
    .unwrap()
}

#[test]
fn a_week_of_check_ins_builds_streak_xp_and_a_freeze() {
    let mut app = HabitApp::default();
    let id = add_daily(&mut app, "meditate");
    let start = date(2024, 3, 1);

    let mut expected_xp = 0u32;
    for day in 0..7u32 {
        let today = start + Duration::days(i64::from(day));
        let outcome = app.toggle_check_in(id, today).unwrap();
        let CheckInOutcome::Added {
            streak,
            xp_gained,
            freeze_earned,
        } = outcome
        else {
            panic!("expected Added");
        };
        assert_eq!(streak, day + 1);
        assert_eq!(xp_gained, 10 + (day + 1) * 2);
        assert_eq!(freeze_earned, day == 6);
        expected_xp += xp_gained;
    }

    assert_eq!(app.progress.xp, expected_xp);
    // The starter freeze plus the one earned on day 7.
    assert_eq!(app.progress.streak_freezes, 2);

    let status = app.active_habits(start + Duration::days(6));
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].streak, 7);
    assert!(status[0].completed_today);
    assert_eq!(status[0].stats.longest_streak, 7);
    assert_eq!(status[0].stats.total_completions, 7);
}

#[test]
fn weekly_habit_streak_follows_its_target_days() {
    let mut app = HabitApp::default();
    // Mon/Wed/Fri schedule.
    let id = app
        .add_habit(
            NewHabit {
                name: "gym".to_string(),
                color: "#3b82f6".to_string(),
                frequency: Frequency::Weekly,
                target_days: vec![1, 3, 5],
                reminder_time: None,
            },
            &mut NoopScheduler,
        )
        .unwrap();

    // 2024-03-04 Mon, 03-06 Wed, 03-08 Fri.
    for day in [date(2024, 3, 4), date(2024, 3, 6), date(2024, 3, 8)] {
        app.toggle_check_in(id, day).unwrap();
    }

    // Saturday is not a target day: the Friday streak still stands.
    let saturday = date(2024, 3, 9);
    let status = &app.active_habits(saturday)[0];
    assert_eq!(status.streak, 3);

    // Missing Monday breaks the chain by Wednesday.
    let next_wednesday = date(2024, 3, 13);
    let status = &app.active_habits(next_wednesday)[0];
    assert_eq!(status.streak, 0);
}

#[test]
fn streak_freeze_rescues_a_missed_day() {
    let mut app = HabitApp::default();
    let id = add_daily(&mut app, "journal");

    // Checked Mon-Wed, missed Thursday, now it is Friday.
    for day in 4..=6u32 {
        app.toggle_check_in(id, date(2024, 3, day)).unwrap();
    }
    let friday = date(2024, 3, 8);
    let status = &app.active_habits(friday)[0];
    assert_eq!(status.streak, 0, "streak is broken before the rescue");

    assert!(app.can_use_streak_freeze(id, friday));
    assert!(app.use_streak_freeze(id, friday));
    assert_eq!(app.progress.streak_freezes, 0);

    // Thursday is backfilled; checking in on Friday continues the chain.
    let outcome = app.toggle_check_in(id, friday).unwrap();
    let CheckInOutcome::Added { streak, .. } = outcome else {
        panic!("expected Added");
    };
    assert_eq!(streak, 5);

    // No credits left, so a later gap cannot be rescued.
    assert!(!app.can_use_streak_freeze(id, date(2024, 3, 10)));
}

#[test]
fn removing_a_check_in_keeps_earned_xp() {
    let mut app = HabitApp::default();
    let id = add_daily(&mut app, "read");
    let today = date(2024, 3, 7);

    app.toggle_check_in(id, today).unwrap();
    let xp_after_add = app.progress.xp;
    assert!(xp_after_add > 0);

    app.toggle_check_in(id, today).unwrap();
    assert_eq!(app.progress.xp, xp_after_add);
    assert!(!app.is_completed_on(id, today));
}

#[test]
fn xp_progress_accounts_for_every_point() {
    let mut app = HabitApp::default();
    let id = add_daily(&mut app, "read");
    for day in 1..=20u32 {
        app.toggle_check_in(id, date(2024, 3, day)).unwrap();
    }

    let progress = app.progress.xp_progress();
    let level = app.progress.level();
    let floor: u32 = (1..level).map(|i| i * 100).sum();
    assert_eq!(floor + progress.current, app.progress.xp);
    assert_eq!(progress.required, level * 100);
}

#[test]
fn clear_all_data_returns_to_first_run_state() {
    let mut app = HabitApp::default();
    let id = add_daily(&mut app, "read");
    app.toggle_check_in(id, date(2024, 3, 7)).unwrap();
    app.set_user_name("Sam");

    app.clear_all_data();
    assert!(app.habits.is_empty());
    assert!(app.check_ins.is_empty());
    assert_eq!(app.progress.xp, 0);
    assert_eq!(app.progress.streak_freezes, 1);
    assert_eq!(app.user_name, "User");
}
