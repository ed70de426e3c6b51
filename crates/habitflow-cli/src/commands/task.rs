use clap::Subcommand;

use super::{load_pomodoro, open_store, parse_uuid, print_json, save_pomodoro, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Planned pomodoros
        #[arg(long, default_value = "1")]
        estimate: u32,
    },
    /// List all tasks as JSON
    List,
    /// Point subsequent focus sessions at a task
    Select {
        /// Task ID
        id: String,
    },
    /// Clear the task selection
    Deselect,
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    let mut store = open_store()?;
    let mut app = load_pomodoro(&store);

    match action {
        TaskAction::Add { title, estimate } => {
            let id = app.add_task(title, estimate)?;
            println!("{id}");
        }
        TaskAction::List => {
            print_json(&app.tasks)?;
        }
        TaskAction::Select { id } => {
            app.select_task(Some(parse_uuid(&id)?))?;
            println!("ok");
        }
        TaskAction::Deselect => {
            app.select_task(None)?;
            println!("ok");
        }
        TaskAction::Delete { id } => {
            app.delete_task(parse_uuid(&id)?)?;
            println!("ok");
        }
    }

    save_pomodoro(&mut store, &app);
    Ok(())
}
