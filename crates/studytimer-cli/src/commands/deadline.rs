use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use studytimer_core::{Clock, Database, DeadlineKind, Deadlines, Priority, SystemClock};

use super::{print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Homework,
    Project,
    Exam,
}

impl From<KindArg> for DeadlineKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Homework => DeadlineKind::Homework,
            KindArg::Project => DeadlineKind::Project,
            KindArg::Exam => DeadlineKind::Exam,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(priority: PriorityArg) -> Self {
        match priority {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Subcommand)]
pub enum DeadlineAction {
    /// Add a deadline
    Add {
        /// What is due
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_enum, default_value = "homework")]
        kind: KindArg,
        #[arg(long, value_enum, default_value = "medium")]
        priority: PriorityArg,
    },
    /// List deadlines, earliest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a deadline by id
    Remove {
        id: String,
    },
}

pub fn run(action: DeadlineAction) -> CliResult {
    let db = Database::open()?;
    let mut list = Deadlines::load(&db)?;

    match action {
        DeadlineAction::Add {
            title,
            date,
            kind,
            priority,
        } => {
            let added = list.add(&title, date, kind.into(), priority.into())?.clone();
            list.save(&db)?;
            print_json(&added)?;
        }
        DeadlineAction::List { json } => {
            let sorted = list.sorted();
            if json {
                print_json(&sorted)?;
            } else if sorted.is_empty() {
                println!("no deadlines");
            } else {
                let today = SystemClock.today();
                for d in sorted {
                    let days = d.days_until(today);
                    let when = match days {
                        n if n < 0 => format!("overdue by {}d", -n),
                        0 => "today".to_string(),
                        n => format!("in {n}d"),
                    };
                    println!(
                        "{}  {}  {:<8} {:<6} {:<12} {}",
                        d.id,
                        d.date,
                        format!("{:?}", d.kind).to_lowercase(),
                        format!("{:?}", d.priority).to_lowercase(),
                        when,
                        d.title
                    );
                }
            }
        }
        DeadlineAction::Remove { id } => {
            let removed = list.remove(&id)?;
            list.save(&db)?;
            println!("removed {}", removed.title);
        }
    }
    Ok(())
}
