//! Timer engine implementation.
//!
//! The engine is a one-second countdown state machine. It does not use
//! internal threads - a [`Scheduler`](super::Scheduler) (or any caller) is
//! responsible for calling `tick()` once per second while it runs.
//!
//! ## State Transitions
//!
//! ```text
//! Focus --(00:00 or switch)--> Break | LongBreak --(00:00 or switch)--> Focus
//! ```
//!
//! Every transition pauses the timer. Completing a focus session bumps the
//! session count and folds the session into [`StudyStats`]; every fourth
//! completed session earns a long break.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::initialize(config, store, sink, clock)?;
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::ModeSwitched) when the interval ends
//! ```

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::state::{Countdown, TimerState};
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::{Event, TransitionTrigger};
use crate::level::LevelConfig;
use crate::notify::{Notification, NotificationSink};
use crate::stats::StudyStats;
use crate::storage::{load_json, save_json, KeyValueStore, STATS_KEY, TIMER_KEY};

/// Core timer engine.
///
/// Owns the countdown state and the study stats for one session, and writes
/// both back to `store` after every change.
pub struct TimerEngine<S: KeyValueStore> {
    config: LevelConfig,
    state: TimerState,
    stats: StudyStats,
    store: S,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> TimerEngine<S> {
    /// Build an engine from whatever `store` holds.
    ///
    /// Missing state is seeded at the start of a focus interval. Malformed
    /// or out-of-range state is discarded, reseeded and written back. An
    /// invalid `config` is replaced with the standard durations.
    ///
    /// # Errors
    /// Returns a storage error if `store` cannot be read. Nothing is
    /// overwritten in that case.
    pub fn initialize(
        config: LevelConfig,
        store: S,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let config = checked_config(config);

        let (mut state, state_recovered) = match load_json::<TimerState>(&store, TIMER_KEY) {
            Ok(Some(state)) => match state.validate() {
                Ok(()) => (state, false),
                Err(e) => {
                    warn!(error = %e, "discarding persisted timer state");
                    (TimerState::seeded(&config), true)
                }
            },
            Ok(None) => (TimerState::seeded(&config), false),
            Err(CoreError::Json(e)) => {
                warn!(error = %e, "discarding malformed timer state");
                (TimerState::seeded(&config), true)
            }
            Err(e) => return Err(e),
        };
        if state.interval_minutes == 0 {
            state.interval_minutes = state.mode_minutes(&config);
        }

        let (stats, stats_recovered) = match load_json::<StudyStats>(&store, STATS_KEY) {
            Ok(stats) => (stats.unwrap_or_default(), false),
            Err(CoreError::Json(e)) => {
                warn!(error = %e, "discarding malformed study stats");
                (StudyStats::default(), true)
            }
            Err(e) => return Err(e),
        };

        debug!(
            minutes = state.minutes_remaining,
            seconds = state.seconds_remaining,
            is_break = state.is_break,
            sessions = state.session_count,
            "timer engine initialized"
        );

        let engine = Self {
            config,
            state,
            stats,
            store,
            sink,
            clock,
        };
        if state_recovered {
            engine.persist_state();
        }
        if stats_recovered {
            engine.persist_stats();
        }
        Ok(engine)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn stats(&self) -> &StudyStats {
        &self.stats
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// 0.0 .. 1.0 progress within the current mode.
    pub fn progress(&self) -> f64 {
        self.state.progress(&self.config)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let mode = self.state.mode();
        Event::StateSnapshot {
            mode,
            mode_label: mode.label().to_string(),
            display: self.state.display(),
            minutes_remaining: self.state.minutes_remaining,
            seconds_remaining: self.state.seconds_remaining,
            is_running: self.state.is_running,
            session_count: self.state.session_count,
            total_secs: u64::from(self.state.interval_length(&self.config)) * 60,
            progress: self.progress(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running {
            return None;
        }
        self.state.is_running = true;
        self.persist_state();
        info!(display = %self.state.display(), "timer started");
        Some(Event::TimerStarted {
            mode: self.state.mode(),
            minutes_remaining: self.state.minutes_remaining,
            seconds_remaining: self.state.seconds_remaining,
            at: self.clock.now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        self.persist_state();
        info!(display = %self.state.display(), "timer paused");
        Some(Event::TimerPaused {
            mode: self.state.mode(),
            minutes_remaining: self.state.minutes_remaining,
            seconds_remaining: self.state.seconds_remaining,
            at: self.clock.now(),
        })
    }

    /// Restore the full length of the current mode and pause.
    /// The session count and stats are left alone.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = self.state.reset(&self.config);
        self.persist_state();
        info!(mode = ?self.state.mode(), "timer reset");
        Some(Event::TimerReset {
            mode: self.state.mode(),
            minutes_remaining: self.state.minutes_remaining,
            at: self.clock.now(),
        })
    }

    /// Start over from a fresh focus interval with no completed sessions.
    pub fn reset_all(&mut self) -> Option<Event> {
        self.state = TimerState::seeded(&self.config);
        self.persist_state();
        info!("timer state cleared");
        Some(Event::TimerReset {
            mode: self.state.mode(),
            minutes_remaining: self.state.minutes_remaining,
            at: self.clock.now(),
        })
    }

    /// Switch between focus and break on request.
    pub fn toggle_mode(&mut self) -> Option<Event> {
        Some(self.transition(TransitionTrigger::Manual))
    }

    /// Advance one second. Returns `Some(Event::ModeSwitched)` when the
    /// countdown was already at 00:00.
    pub fn tick(&mut self) -> Option<Event> {
        match self.state.countdown() {
            Countdown::Idle => None,
            Countdown::Counted(next) => {
                self.state = next;
                trace!(display = %self.state.display(), "tick");
                self.persist_state();
                None
            }
            Countdown::Expired => Some(self.transition(TransitionTrigger::Timer)),
        }
    }

    /// Swap in new durations, e.g. after the study level changed.
    ///
    /// The timer is paused and the remaining time kept; the new lengths
    /// apply from the next reset or transition. Any periodic task driving
    /// `tick()` must be cancelled before calling this.
    pub fn reconfigure(&mut self, config: LevelConfig) {
        self.config = checked_config(config);
        if self.state.is_running {
            self.state.is_running = false;
            self.persist_state();
        }
        info!(focus = self.config.focus_minutes, "timer reconfigured");
    }

    /// Forget all study statistics.
    pub fn clear_stats(&mut self) {
        self.stats = StudyStats::default();
        self.persist_stats();
        info!("study stats cleared");
    }

    /// Write both the timer state and the stats, reporting failures.
    ///
    /// # Errors
    /// Returns an error if either write fails.
    pub fn persist(&self) -> Result<()> {
        save_json(&self.store, TIMER_KEY, &self.state)?;
        save_json(&self.store, STATS_KEY, &self.stats)?;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, trigger: TransitionTrigger) -> Event {
        // Credit the length the focus session started with, not the
        // currently configured one.
        let completed_minutes = self.state.interval_length(&self.config);
        let (next, transition) = self.state.transition(&self.config);

        if transition.completed_focus {
            self.stats = self
                .stats
                .record_focus_session(completed_minutes, self.clock.today());
        }
        self.state = next;

        // Timer first: a failure in between leaves stats one write behind.
        self.persist_state();
        if transition.completed_focus {
            self.persist_stats();
        }

        info!(
            ?trigger,
            completed_focus = transition.completed_focus,
            is_long_break = transition.is_long_break,
            sessions = self.state.session_count,
            "mode switched"
        );
        self.sink.notify(Notification::for_transition(&transition));

        Event::ModeSwitched {
            trigger,
            completed_focus: transition.completed_focus,
            is_long_break: transition.is_long_break,
            mode: self.state.mode(),
            minutes_remaining: self.state.minutes_remaining,
            session_count: self.state.session_count,
            at: self.clock.now(),
        }
    }

    fn persist_state(&self) {
        if let Err(e) = save_json(&self.store, TIMER_KEY, &self.state) {
            warn!(error = %e, "failed to persist timer state");
        }
    }

    fn persist_stats(&self) {
        if let Err(e) = save_json(&self.store, STATS_KEY, &self.stats) {
            warn!(error = %e, "failed to persist study stats");
        }
    }
}

fn checked_config(config: LevelConfig) -> LevelConfig {
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!(error = %e, "invalid level config, using standard durations");
            LevelConfig::STANDARD
        }
    }
}
