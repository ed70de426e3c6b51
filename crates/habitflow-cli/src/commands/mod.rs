pub mod config;
pub mod data;
pub mod habit;
pub mod stats;
pub mod task;
pub mod timer;

use habitflow_core::storage::{
    load_or_default, save_best_effort, Config, JsonFileStore, HABITS_KEY, POMODORO_KEY,
};
use habitflow_core::{date, HabitApp, PomodoroApp};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_store() -> Result<JsonFileStore, Box<dyn std::error::Error>> {
    Ok(JsonFileStore::open_default()?)
}

/// Load the pomodoro snapshot, overlay the TOML config on it and roll the
/// daily counter if the calendar day changed since the last run.
pub fn load_pomodoro(store: &JsonFileStore) -> PomodoroApp {
    let mut app: PomodoroApp = load_or_default(store, POMODORO_KEY);
    let config = Config::load_or_default();
    app.apply_config(config.timer);
    app.set_daily_goal(config.daily_goal);
    app.check_daily_reset(date::today());
    app
}

pub fn save_pomodoro(store: &mut JsonFileStore, app: &PomodoroApp) {
    save_best_effort(store, POMODORO_KEY, app);
}

pub fn load_habits(store: &JsonFileStore) -> HabitApp {
    load_or_default(store, HABITS_KEY)
}

pub fn save_habits(store: &mut JsonFileStore, app: &HabitApp) {
    save_best_effort(store, HABITS_KEY, app);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn parse_uuid(raw: &str) -> Result<uuid::Uuid, Box<dyn std::error::Error>> {
    Ok(uuid::Uuid::parse_str(raw)?)
}
