use clap::Subcommand;
use serde::Serialize;
use studytimer_core::{Clock, StudyStats, SystemClock, UserProfile};

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Session, minute and day-streak totals
    Show,
    /// Zero all totals
    Reset,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport<'a> {
    #[serde(flatten)]
    stats: &'a StudyStats,
    studied_today: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    daily_goal_hours: Option<u32>,
}

pub fn run(action: StatsAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        StatsAction::Show => {
            let daily_goal_hours = UserProfile::load(engine.store())?
                .and_then(|p| p.daily_goal_hours().ok());
            let report = StatsReport {
                stats: engine.stats(),
                studied_today: engine.stats().studied_on(SystemClock.today()),
                daily_goal_hours,
            };
            print_json(&report)?;
        }
        StatsAction::Reset => {
            engine.clear_stats();
            engine.persist()?;
            println!("stats reset");
        }
    }
    Ok(())
}
