use clap::Subcommand;
use habitflow_core::storage::{export_text, SnapshotStore, HABITS_KEY, POMODORO_KEY};

use super::{load_habits, load_pomodoro, open_store, CliResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Print all persisted state as pretty JSON
    Export,
    /// Delete all persisted state
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CliResult {
    let mut store = open_store()?;

    match action {
        DataAction::Export => {
            let pomodoro = load_pomodoro(&store);
            let habits = load_habits(&store);
            println!(
                "{}",
                export_text(&serde_json::json!({
                    "pomodoro": pomodoro,
                    "habits": habits,
                }))?
            );
        }
        DataAction::Clear { yes } => {
            if !yes {
                eprintln!("refusing to clear data without --yes");
                std::process::exit(1);
            }
            store.remove(POMODORO_KEY)?;
            store.remove(HABITS_KEY)?;
            println!("all data cleared");
        }
    }
    Ok(())
}
