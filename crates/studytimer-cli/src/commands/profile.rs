use clap::Subcommand;
use studytimer_core::{Database, StudyLevel, UserProfile};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the saved profile
    Show,
    /// Create or replace the profile
    Set {
        /// Student name (at least 2 characters)
        #[arg(long)]
        name: String,
        /// Study level: standard (9-12), exam_track_a (NEET) or exam_track_b (IIT-JEE)
        #[arg(long, default_value = "standard")]
        level: StudyLevel,
        /// School class, 9-12 (standard level only)
        #[arg(long)]
        class: Option<String>,
        /// Daily study goal in hours
        #[arg(long, default_value = "2")]
        goal: String,
    },
    /// Delete the saved profile
    Clear,
}

pub fn run(action: ProfileAction) -> CliResult {
    let db = Database::open()?;

    match action {
        ProfileAction::Show => match UserProfile::load(&db)? {
            Some(profile) => print_json(&profile)?,
            None => println!("no profile saved"),
        },
        ProfileAction::Set {
            name,
            level,
            class,
            goal,
        } => {
            let profile = UserProfile::new(&name, level, class.as_deref(), &goal)?;
            profile.save(&db)?;
            print_json(&profile)?;
        }
        ProfileAction::Clear => {
            UserProfile::clear(&db)?;
            println!("profile cleared");
        }
    }
    Ok(())
}
