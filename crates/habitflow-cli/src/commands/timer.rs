use clap::Subcommand;
use habitflow_core::{date, TimerMode};

use super::{load_pomodoro, open_store, print_json, save_pomodoro, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset the current interval to its full duration
    Reset,
    /// Skip to the next interval without counting this one
    Skip,
    /// Advance the countdown by one second
    Tick,
    /// Switch to a mode (focus, short-break, long-break)
    Mode {
        mode: String,
    },
    /// Reconcile with the wall clock and print the timer state as JSON
    Status,
}

fn parse_mode(raw: &str) -> Result<TimerMode, Box<dyn std::error::Error>> {
    match raw {
        "focus" => Ok(TimerMode::Focus),
        "short-break" => Ok(TimerMode::ShortBreak),
        "long-break" => Ok(TimerMode::LongBreak),
        other => Err(format!("unknown mode '{other}' (focus, short-break, long-break)").into()),
    }
}

pub fn run(action: TimerAction) -> CliResult {
    let mut store = open_store()?;
    let mut app = load_pomodoro(&store);
    let today = date::today();

    match action {
        TimerAction::Start => {
            if let Some(event) = app.start_timer() {
                print_json(&event)?;
            } else {
                print_json(&app.timer.snapshot(&app.config))?;
            }
        }
        TimerAction::Pause => {
            if let Some(event) = app.pause_timer() {
                print_json(&event)?;
            } else {
                print_json(&app.timer.snapshot(&app.config))?;
            }
        }
        TimerAction::Reset => {
            let event = app.reset_timer();
            print_json(&event)?;
        }
        TimerAction::Skip => {
            let event = app.skip_timer();
            print_json(&event)?;
        }
        TimerAction::Tick => {
            if let Some(completion) = app.tick(today) {
                print_json(&completion)?;
            } else {
                print_json(&app.timer.snapshot(&app.config))?;
            }
        }
        TimerAction::Mode { mode } => {
            let event = app.set_mode(parse_mode(&mode)?);
            print_json(&event)?;
        }
        TimerAction::Status => {
            // Repair the countdown first so the snapshot reflects wall
            // time, and surface a completion that fired while we were away.
            if let Some(completion) = app.reconcile(today) {
                print_json(&completion)?;
            }
            print_json(&app.timer.snapshot(&app.config))?;
        }
    }

    save_pomodoro(&mut store, &app);
    Ok(())
}
