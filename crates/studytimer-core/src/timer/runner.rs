//! Owner of a running engine and its once-per-second tick task.
//!
//! Every user command cancels the tick task before touching the engine, and
//! the cancellation is published under the engine lock, so a tick that was
//! already queued can never land after a reset, a switch or a
//! reconfiguration.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use super::engine::TimerEngine;
use super::scheduler::{Scheduler, TaskHandle};
use crate::error::Result;
use crate::events::Event;
use crate::level::LevelConfig;
use crate::storage::KeyValueStore;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

type SharedEngine<St> = Arc<Mutex<TimerEngine<St>>>;

struct Ticker<H> {
    handle: H,
    armed: Arc<AtomicBool>,
}

pub struct TimerRunner<St, Sc>
where
    St: KeyValueStore + Send + 'static,
    Sc: Scheduler,
{
    engine: SharedEngine<St>,
    scheduler: Sc,
    ticker: Option<Ticker<Sc::Handle>>,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl<St, Sc> TimerRunner<St, Sc>
where
    St: KeyValueStore + Send + 'static,
    Sc: Scheduler,
{
    /// Take ownership of `engine`. A state restored as running resumes
    /// ticking straight away.
    pub fn new(engine: TimerEngine<St>, scheduler: Sc) -> Self {
        let mut runner = Self {
            engine: Arc::new(Mutex::new(engine)),
            scheduler,
            ticker: None,
            events: None,
        };
        if runner.lock().is_running() {
            tracing::debug!("resuming restored running timer");
            runner.spawn_ticker();
        }
        runner
    }

    /// Receive events produced by scheduled ticks (mode switches).
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        // Rearm so the running task sees the new sender.
        if self.is_ticking() {
            let engine = Arc::clone(&self.engine);
            let _guard = lock(&engine);
            self.stop_ticker();
            self.spawn_ticker();
        }
        rx
    }

    /// Run `f` against the engine under its lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&TimerEngine<St>) -> R) -> R {
        f(&self.lock())
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| t.handle.is_active())
    }

    pub fn start(&mut self) -> Option<Event> {
        let engine = Arc::clone(&self.engine);
        let mut guard = lock(&engine);
        if guard.is_running() && self.is_ticking() {
            return None;
        }
        let event = guard.start();
        self.stop_ticker();
        self.spawn_ticker();
        event
    }

    pub fn pause(&mut self) -> Option<Event> {
        let engine = Arc::clone(&self.engine);
        let mut guard = lock(&engine);
        self.stop_ticker();
        guard.pause()
    }

    pub fn reset(&mut self) -> Option<Event> {
        let engine = Arc::clone(&self.engine);
        let mut guard = lock(&engine);
        self.stop_ticker();
        guard.reset()
    }

    pub fn toggle_mode(&mut self) -> Option<Event> {
        let engine = Arc::clone(&self.engine);
        let mut guard = lock(&engine);
        self.stop_ticker();
        guard.toggle_mode()
    }

    /// Apply new durations after a level change. Ticking stops first.
    pub fn reconfigure(&mut self, config: LevelConfig) {
        let engine = Arc::clone(&self.engine);
        let mut guard = lock(&engine);
        self.stop_ticker();
        guard.reconfigure(config);
    }

    /// Stop ticking and flush state to the store.
    ///
    /// # Errors
    /// Returns an error if the final write fails.
    pub fn shutdown(mut self) -> Result<()> {
        let engine = Arc::clone(&self.engine);
        let guard = lock(&engine);
        self.stop_ticker();
        let flushed = guard.persist();
        drop(guard);
        flushed
    }

    fn lock(&self) -> MutexGuard<'_, TimerEngine<St>> {
        lock(&self.engine)
    }

    /// Caller must hold the engine lock.
    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.armed.store(false, Ordering::SeqCst);
            ticker.handle.cancel();
        }
    }

    fn spawn_ticker(&mut self) {
        let armed = Arc::new(AtomicBool::new(true));
        let task_armed = Arc::clone(&armed);
        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();

        let handle = self.scheduler.every(
            TICK_PERIOD,
            Box::new(move || {
                let mut engine = lock(&engine);
                if !task_armed.load(Ordering::SeqCst) {
                    return ControlFlow::Break(());
                }
                if let Some(event) = engine.tick() {
                    if let Some(tx) = &events {
                        if tx.send(event).is_err() {
                            tracing::debug!("event receiver closed");
                        }
                    }
                }
                if engine.is_running() {
                    ControlFlow::Continue(())
                } else {
                    // Auto-paused by a transition.
                    ControlFlow::Break(())
                }
            }),
        );
        self.ticker = Some(Ticker { handle, armed });
    }
}

impl<St, Sc> Drop for TimerRunner<St, Sc>
where
    St: KeyValueStore + Send + 'static,
    Sc: Scheduler,
{
    fn drop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.armed.store(false, Ordering::SeqCst);
            ticker.handle.cancel();
        }
    }
}

fn lock<St: KeyValueStore>(engine: &SharedEngine<St>) -> MutexGuard<'_, TimerEngine<St>> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}
