use clap::Subcommand;
use habitflow_core::{date, Frequency, HabitUpdate, NewHabit, NoopScheduler};

use super::{load_habits, open_store, parse_uuid, print_json, save_habits, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a habit
    Add {
        /// Habit name
        name: String,
        /// Display color
        #[arg(long, default_value = "#22c55e")]
        color: String,
        /// Frequency: daily or weekly
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Target weekdays for weekly habits, 0=Sunday (e.g. 1,3,5)
        #[arg(long, value_delimiter = ',')]
        target_days: Vec<u8>,
        /// Daily reminder time as HH:mm
        #[arg(long)]
        reminder: Option<String>,
    },
    /// Rename a habit
    Rename {
        /// Habit ID
        id: String,
        /// New name
        name: String,
    },
    /// List habits with their streaks as JSON
    List {
        /// Show archived habits instead
        #[arg(long)]
        archived: bool,
    },
    /// Toggle today's check-in
    Check {
        /// Habit ID
        id: String,
    },
    /// Archive a habit, keeping its history
    Archive {
        /// Habit ID
        id: String,
    },
    /// Restore an archived habit
    Unarchive {
        /// Habit ID
        id: String,
    },
    /// Delete a habit and its check-in history
    Delete {
        /// Habit ID
        id: String,
    },
    /// Spend a streak freeze to backfill yesterday
    Freeze {
        /// Habit ID
        id: String,
    },
    /// Print one habit's statistics as JSON
    Stats {
        /// Habit ID
        id: String,
    },
}

fn parse_frequency(raw: &str) -> Result<Frequency, Box<dyn std::error::Error>> {
    match raw {
        "daily" => Ok(Frequency::Daily),
        "weekly" => Ok(Frequency::Weekly),
        other => Err(format!("unknown frequency '{other}' (daily, weekly)").into()),
    }
}

pub fn run(action: HabitAction) -> CliResult {
    let mut store = open_store()?;
    let mut app = load_habits(&store);
    let mut scheduler = NoopScheduler;
    let today = date::today();

    match action {
        HabitAction::Add {
            name,
            color,
            frequency,
            target_days,
            reminder,
        } => {
            let id = app.add_habit(
                NewHabit {
                    name,
                    color,
                    frequency: parse_frequency(&frequency)?,
                    target_days,
                    reminder_time: reminder,
                },
                &mut scheduler,
            )?;
            println!("{id}");
        }
        HabitAction::Rename { id, name } => {
            app.update_habit(
                parse_uuid(&id)?,
                HabitUpdate {
                    name: Some(name),
                    ..HabitUpdate::default()
                },
                &mut scheduler,
            )?;
            println!("ok");
        }
        HabitAction::List { archived } => {
            let habits = if archived {
                app.archived_habits(today)
            } else {
                app.active_habits(today)
            };
            print_json(&habits)?;
        }
        HabitAction::Check { id } => {
            let outcome = app.toggle_check_in(parse_uuid(&id)?, today)?;
            print_json(&outcome)?;
        }
        HabitAction::Archive { id } => {
            app.archive_habit(parse_uuid(&id)?, &mut scheduler)?;
            println!("ok");
        }
        HabitAction::Unarchive { id } => {
            app.unarchive_habit(parse_uuid(&id)?, &mut scheduler)?;
            println!("ok");
        }
        HabitAction::Delete { id } => {
            app.delete_habit(parse_uuid(&id)?, &mut scheduler)?;
            println!("ok");
        }
        HabitAction::Freeze { id } => {
            if app.use_streak_freeze(parse_uuid(&id)?, today) {
                println!("ok");
            } else {
                eprintln!("streak freeze not applicable");
                std::process::exit(1);
            }
        }
        HabitAction::Stats { id } => {
            let stats = app.stats_for(parse_uuid(&id)?, today)?;
            print_json(&stats)?;
        }
    }

    save_habits(&mut store, &app);
    Ok(())
}
