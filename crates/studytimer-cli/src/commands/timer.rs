use std::time::Duration;

use clap::Subcommand;
use studytimer_core::{Database, Event, TimerEngine, TimerRunner, TokioScheduler};

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Mark the timer as running (use `run` to count down live)
    Start,
    /// Pause the countdown
    Pause,
    /// Restore the full length of the current mode
    Reset,
    /// Switch between focus and break now
    Switch,
    /// Print current timer state as JSON
    Status,
    /// Advance a running timer by whole seconds
    Tick {
        /// Number of one-second ticks
        #[arg(long, default_value = "1")]
        count: u32,
    },
    /// Start and count down in the foreground until the next switch or Ctrl-C
    Run,
    /// Forget the session count and start over from a fresh focus interval
    ResetAll,
}

pub fn run(action: TimerAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        TimerAction::Start => {
            let event = engine.start();
            print_event_or_snapshot(&engine, event)?;
        }
        TimerAction::Pause => {
            let event = engine.pause();
            print_event_or_snapshot(&engine, event)?;
        }
        TimerAction::Reset => {
            let event = engine.reset();
            print_event_or_snapshot(&engine, event)?;
        }
        TimerAction::Switch => {
            let event = engine.toggle_mode();
            print_event_or_snapshot(&engine, event)?;
        }
        TimerAction::Status => print_json(&engine.snapshot())?,
        TimerAction::Tick { count } => {
            for _ in 0..count {
                if let Some(event) = engine.tick() {
                    print_json(&event)?;
                }
            }
            print_json(&engine.snapshot())?;
        }
        TimerAction::Run => return run_live(engine),
        TimerAction::ResetAll => {
            let event = engine.reset_all();
            print_event_or_snapshot(&engine, event)?;
        }
    }

    engine.persist()?;
    Ok(())
}

fn print_event_or_snapshot(
    engine: &TimerEngine<Database>,
    event: Option<Event>,
) -> CliResult {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&engine.snapshot()),
    }
}

/// Drive the engine with a real one-second scheduler.
fn run_live(engine: TimerEngine<Database>) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let scheduler = TokioScheduler::from_current().ok_or("tokio runtime not running")?;
        let mut runner = TimerRunner::new(engine, scheduler);
        let mut events = runner.subscribe();
        if let Some(event) = runner.start() {
            print_json(&event)?;
        }

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut display = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    eprintln!();
                    if let Some(event) = runner.pause() {
                        print_json(&event)?;
                    }
                    break;
                }
                Some(event) = events.recv() => {
                    eprintln!();
                    print_json(&event)?;
                    break;
                }
                _ = display.tick() => {
                    let line = runner.with_engine(|e| {
                        format!(
                            "{} {}  session {}  {:>3.0}%",
                            e.state().mode().label(),
                            e.state().display(),
                            e.state().session_count + 1,
                            e.progress() * 100.0
                        )
                    });
                    eprint!("\r{line}");
                }
            }
        }

        runner.shutdown()?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
