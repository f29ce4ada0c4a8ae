pub mod config;
pub mod deadline;
pub mod profile;
pub mod stats;
pub mod timer;

use std::error::Error;
use std::io::IsTerminal;
use std::sync::Arc;

use serde::Serialize;
use studytimer_core::{
    Config, Database, Notification, NotificationSink, NullSink, SystemClock, TimerEngine,
    TracingSink, UserProfile,
};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Prints transition messages to stderr so stdout stays machine-readable.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        eprintln!("\n[{}] {}", notification.title, notification.body);
    }
}

/// Open the store and build an engine for the saved profile's level.
pub fn open_engine() -> Result<TimerEngine<Database>, Box<dyn Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let level = UserProfile::load(&db)?.map(|p| p.study_level);
    let level_config = config.resolver().resolve_or_default(level);
    tracing::debug!(?level, ?level_config, "opening timer engine");

    // Without a terminal, notifications go to the log instead.
    let sink: Arc<dyn NotificationSink> = if !config.notifications.enabled {
        Arc::new(NullSink)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ConsoleSink)
    } else {
        Arc::new(TracingSink)
    };
    let engine = TimerEngine::initialize(level_config, db, sink, Arc::new(SystemClock))?;
    Ok(engine)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
