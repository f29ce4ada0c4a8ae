mod engine;
mod runner;
mod scheduler;
mod state;

pub use engine::TimerEngine;
pub use runner::{TimerRunner, TICK_PERIOD};
pub use scheduler::{
    ManualScheduler, ManualTaskHandle, RepeatingTask, Scheduler, TaskHandle, TokioScheduler,
    TokioTaskHandle,
};
pub use state::{earns_long_break, Countdown, TimerMode, TimerState, Transition, SESSIONS_PER_LONG_BREAK};
