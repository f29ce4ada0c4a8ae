//! Countdown state and the pure rules that move it.
//!
//! Nothing in here touches storage, clocks, or notifications. The engine
//! wraps these functions and adds the side effects.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::level::LevelConfig;

/// Every this-many completed focus sessions earns a long break.
pub const SESSIONS_PER_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    Break,
    LongBreak,
}

impl TimerMode {
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus Time",
            TimerMode::Break => "Break Time",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

/// Persisted countdown state.
///
/// `seconds_remaining` is always within `0..=59`; a zero/zero countdown is
/// resolved by a transition on the next tick, never by going negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    #[serde(alias = "minutes")]
    pub minutes_remaining: u32,
    #[serde(alias = "seconds")]
    pub seconds_remaining: u32,
    #[serde(alias = "isActive")]
    pub is_running: bool,
    pub is_break: bool,
    /// Focus sessions completed so far.
    pub session_count: u32,
    /// Full length of the running interval, fixed when it began. Zero for
    /// state saved without it; the configured length is used instead.
    #[serde(default)]
    pub interval_minutes: u32,
}

/// What a transition did, as reported to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// A focus session just ended (focus -> break).
    pub completed_focus: bool,
    /// The break being entered is a long one.
    pub is_long_break: bool,
}

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Timer is paused; nothing moved.
    Idle,
    /// One second elapsed.
    Counted(TimerState),
    /// Already at 00:00; the caller must transition instead.
    Expired,
}

/// Whether leaving focus with `completed` sessions already counted lands in
/// a long break. Evaluated before the count is bumped for this transition.
pub fn earns_long_break(completed: u32) -> bool {
    completed > 0 && (completed + 1) % SESSIONS_PER_LONG_BREAK == 0
}

impl TimerState {
    /// Fresh state at the start of a focus interval.
    pub fn seeded(config: &LevelConfig) -> Self {
        Self {
            minutes_remaining: config.focus_minutes,
            seconds_remaining: 0,
            is_running: false,
            is_break: false,
            session_count: 0,
            interval_minutes: config.focus_minutes,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.seconds_remaining > 59 {
            return Err(ValidationError::invalid(
                "secondsRemaining",
                format!("{} is outside 0..=59", self.seconds_remaining),
            ));
        }
        Ok(())
    }

    /// True while inside a long break.
    ///
    /// The count was bumped when the break began, so this checks the rule
    /// against the pre-bump value `session_count - 1`. It therefore agrees
    /// with whatever the transition decided for as long as the break lasts.
    pub fn in_long_break(&self) -> bool {
        self.is_break && self.session_count > 0 && earns_long_break(self.session_count - 1)
    }

    pub fn mode(&self) -> TimerMode {
        if !self.is_break {
            TimerMode::Focus
        } else if self.in_long_break() {
            TimerMode::LongBreak
        } else {
            TimerMode::Break
        }
    }

    /// Configured length of the current mode in minutes.
    pub fn mode_minutes(&self, config: &LevelConfig) -> u32 {
        config.minutes_for(self.is_break, self.in_long_break())
    }

    /// Length the running interval started with. Durations changed since
    /// then only apply from the next reset or transition.
    pub fn interval_length(&self, config: &LevelConfig) -> u32 {
        if self.interval_minutes > 0 {
            self.interval_minutes
        } else {
            self.mode_minutes(config)
        }
    }

    pub fn seconds_left(&self) -> u64 {
        u64::from(self.minutes_remaining) * 60 + u64::from(self.seconds_remaining)
    }

    /// Fraction of the current mode already elapsed, clamped to `0.0..=1.0`.
    pub fn progress(&self, config: &LevelConfig) -> f64 {
        let total = u64::from(self.interval_length(config)) * 60;
        if total == 0 {
            return 0.0;
        }
        let elapsed = total as f64 - self.seconds_left() as f64;
        (elapsed / total as f64).clamp(0.0, 1.0)
    }

    /// `MM:SS` as shown on the timer face.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.minutes_remaining, self.seconds_remaining)
    }

    /// Advance by one second.
    pub fn countdown(&self) -> Countdown {
        if !self.is_running {
            return Countdown::Idle;
        }
        let mut next = *self;
        if next.seconds_remaining > 0 {
            next.seconds_remaining -= 1;
        } else if next.minutes_remaining > 0 {
            next.minutes_remaining -= 1;
            next.seconds_remaining = 59;
        } else {
            return Countdown::Expired;
        }
        Countdown::Counted(next)
    }

    /// Flip between focus and break.
    ///
    /// Entering a break bumps `session_count`; leaving one does not. The new
    /// interval starts paused at its full length.
    pub fn transition(&self, config: &LevelConfig) -> (TimerState, Transition) {
        let entering_break = !self.is_break;
        let is_long_break = entering_break && earns_long_break(self.session_count);

        let minutes = config.minutes_for(entering_break, is_long_break);
        let next = TimerState {
            minutes_remaining: minutes,
            seconds_remaining: 0,
            is_running: false,
            is_break: entering_break,
            session_count: if entering_break {
                self.session_count.saturating_add(1)
            } else {
                self.session_count
            },
            interval_minutes: minutes,
        };

        (
            next,
            Transition {
                completed_focus: entering_break,
                is_long_break,
            },
        )
    }

    /// Back to the full length of the current mode, paused.
    pub fn reset(&self, config: &LevelConfig) -> TimerState {
        let minutes = self.mode_minutes(config);
        TimerState {
            minutes_remaining: minutes,
            seconds_remaining: 0,
            is_running: false,
            interval_minutes: minutes,
            ..*self
        }
    }
}
