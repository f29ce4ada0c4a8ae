//! # Study Timer Core Library
//!
//! Core logic for a personal study-session timer that alternates focus and
//! break intervals, counts completed sessions and keeps simple study stats.
//! The `studytimer` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Level resolver**: maps a study level to focus/break/long-break minutes
//! - **Timer engine**: one-second countdown state machine; the caller (or a
//!   [`Scheduler`]) invokes `tick()` once per second
//! - **Stats**: session, minute and day-streak totals updated when a focus
//!   session completes
//! - **Storage**: key-value persistence (SQLite or in-memory) and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerRunner`]: Owns an engine and its repeating tick task
//! - [`StudyStats`]: Aggregated study statistics
//! - [`Database`]: Durable key-value store
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod deadlines;
pub mod error;
pub mod events;
pub mod level;
pub mod notify;
pub mod profile;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use deadlines::{Deadline, DeadlineKind, Deadlines, Priority};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, TransitionTrigger};
pub use level::{resolve, LevelConfig, LevelResolver, StudyLevel};
pub use notify::{ChannelSink, MemorySink, Notification, NotificationSink, NullSink, TracingSink};
pub use profile::UserProfile;
pub use stats::StudyStats;
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{
    ManualScheduler, Scheduler, TaskHandle, TimerEngine, TimerMode, TimerRunner, TimerState,
    TokioScheduler, Transition,
};
