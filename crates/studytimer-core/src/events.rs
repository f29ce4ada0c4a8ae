use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// What caused a mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionTrigger {
    /// The countdown reached 00:00.
    Timer,
    /// The user asked to switch.
    Manual,
}

/// Every state change in the engine produces an Event.
/// Outer surfaces print or forward them; the engine never reads them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        minutes_remaining: u32,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        minutes_remaining: u32,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        minutes_remaining: u32,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        trigger: TransitionTrigger,
        completed_focus: bool,
        is_long_break: bool,
        mode: TimerMode,
        minutes_remaining: u32,
        session_count: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        mode_label: String,
        display: String,
        minutes_remaining: u32,
        seconds_remaining: u32,
        is_running: bool,
        session_count: u32,
        total_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_mode_switch(&self) -> bool {
        matches!(self, Event::ModeSwitched { .. })
    }
}
