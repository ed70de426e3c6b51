//! Persistence round trips through the snapshot gateway: save, reload,
//! survive corruption and keep working when the backend fails.

use chrono::NaiveDate;
use habitflow_core::storage::{
    export_text, load_or_default, save_best_effort, JsonFileStore, MemoryStore, SnapshotStore,
    HABITS_KEY, POMODORO_KEY,
};
use habitflow_core::{
    Frequency, HabitApp, NewHabit, NoopScheduler, PomodoroApp, StorageError, TimerConfig,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct BrokenStore;

impl SnapshotStore for BrokenStore {
    fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("backend offline".into()))
    }
    fn save(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("backend offline".into()))
    }
    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("backend offline".into()))
    }
}

#[test]
fn both_apps_round_trip_through_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path());
    let today = date(2024, 3, 7);

    let mut pomodoro = PomodoroApp::default();
    pomodoro.apply_config(TimerConfig {
        focus_duration: 60,
        ..TimerConfig::default()
    });
    pomodoro.check_daily_reset(today);
    pomodoro.add_task("ship it", 3).unwrap();

    let mut habits = HabitApp::default();
    let id = habits
        .add_habit(
            NewHabit {
                name: "water".to_string(),
                color: "#0ea5e9".to_string(),
                frequency: Frequency::Daily,
                target_days: Vec::new(),
                reminder_time: None,
            },
            &mut NoopScheduler,
        )
        .unwrap();
    habits.toggle_check_in(id, today).unwrap();

    assert!(save_best_effort(&mut store, POMODORO_KEY, &pomodoro));
    assert!(save_best_effort(&mut store, HABITS_KEY, &habits));

    let restored_pomodoro: PomodoroApp = load_or_default(&store, POMODORO_KEY);
    assert_eq!(restored_pomodoro.tasks.len(), 1);
    assert_eq!(restored_pomodoro.config.focus_duration, 60);
    assert_eq!(restored_pomodoro.last_active_date, Some(today));

    let restored_habits: HabitApp = load_or_default(&store, HABITS_KEY);
    assert_eq!(restored_habits.habits.len(), 1);
    assert!(restored_habits.is_completed_on(id, today));
    assert_eq!(restored_habits.progress.xp, habits.progress.xp);
}

#[test]
fn corrupt_snapshot_yields_a_fresh_app() {
    let mut store = MemoryStore::default();
    store.save(POMODORO_KEY, "{\"version\": \"what\"").unwrap();

    let app: PomodoroApp = load_or_default(&store, POMODORO_KEY);
    assert!(app.tasks.is_empty());
    assert_eq!(app.daily_goal, 8);
}

#[test]
fn old_snapshots_with_missing_fields_still_load() {
    let mut store = MemoryStore::default();
    // A minimal snapshot from before most fields existed.
    store.save(POMODORO_KEY, r#"{"daily_goal": 5}"#).unwrap();
    store.save(HABITS_KEY, r#"{"user_name": "Kim"}"#).unwrap();

    let pomodoro: PomodoroApp = load_or_default(&store, POMODORO_KEY);
    assert_eq!(pomodoro.daily_goal, 5);
    assert_eq!(pomodoro.config, TimerConfig::default());

    let habits: HabitApp = load_or_default(&store, HABITS_KEY);
    assert_eq!(habits.user_name, "Kim");
    assert_eq!(habits.progress.streak_freezes, 1);
}

#[test]
fn a_failing_backend_never_loses_the_live_state() {
    let mut store = BrokenStore;
    let mut app = PomodoroApp::default();
    app.add_task("resilient", 1).unwrap();

    // The save fails, the state stays intact, nothing panics.
    assert!(!save_best_effort(&mut store, POMODORO_KEY, &app));
    assert_eq!(app.tasks.len(), 1);

    // Loading from the broken backend falls back to defaults.
    let fallback: PomodoroApp = load_or_default(&store, POMODORO_KEY);
    assert!(fallback.tasks.is_empty());
}

#[test]
fn export_contains_the_full_state_as_pretty_json() {
    let mut habits = HabitApp::default();
    let id = habits
        .add_habit(
            NewHabit {
                name: "water".to_string(),
                color: "#0ea5e9".to_string(),
                frequency: Frequency::Daily,
                target_days: Vec::new(),
                reminder_time: None,
            },
            &mut NoopScheduler,
        )
        .unwrap();
    habits.toggle_check_in(id, date(2024, 3, 7)).unwrap();

    let text = export_text(&habits).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["habits"][0]["name"], "water");
    assert_eq!(parsed["check_ins"][0]["date"], "2024-03-07");
    assert!(text.contains('\n'));
}
