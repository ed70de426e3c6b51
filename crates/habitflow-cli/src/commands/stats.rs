use clap::Subcommand;
use habitflow_core::date;
use serde::Serialize;

use super::{load_habits, load_pomodoro, open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's focus counters and goal progress
    Today,
    /// Focus sessions per day over the last 7 days
    Weekly,
    /// XP, level and streaks across both apps
    Progress,
}

#[derive(Serialize)]
struct ProgressReport {
    level: u32,
    xp: u32,
    xp_progress: habitflow_core::XpProgress,
    total_focus_sessions: u32,
    total_focus_minutes: u32,
    current_streak: u32,
    longest_streak: u32,
    habit_level: u32,
    habit_xp: u32,
    streak_freezes: u32,
}

pub fn run(action: StatsAction) -> CliResult {
    let store = open_store()?;
    let app = load_pomodoro(&store);
    let today = date::today();

    match action {
        StatsAction::Today => {
            print_json(&serde_json::json!({
                "stats": app.today_stats(today),
                "goal": app.daily_progress(),
            }))?;
        }
        StatsAction::Weekly => {
            print_json(&app.weekly_data(today))?;
        }
        StatsAction::Progress => {
            let habits = load_habits(&store);
            print_json(&ProgressReport {
                level: app.progress.level(),
                xp: app.progress.xp,
                xp_progress: app.progress.xp_progress(),
                total_focus_sessions: app.progress.total_focus_sessions,
                total_focus_minutes: app.progress.total_focus_minutes,
                current_streak: app.progress.current_streak,
                longest_streak: app.progress.longest_streak,
                habit_level: habits.progress.level(),
                habit_xp: habits.progress.xp,
                streak_freezes: habits.progress.streak_freezes,
            })?;
        }
    }
    Ok(())
}
