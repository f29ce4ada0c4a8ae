//! Repeating-task schedulers that drive `TimerEngine::tick`.
//!
//! The engine never sleeps. A [`Scheduler`] owns the wall clock and calls a
//! task once per period until the task asks to stop or its handle is
//! cancelled. [`TokioScheduler`] uses a real `tokio::time::interval`;
//! [`ManualScheduler`] only fires when told to, for tests.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Work run once per period. Returning `Break` stops the repetition.
pub type RepeatingTask = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

/// Handle to a scheduled repeating task.
pub trait TaskHandle: Send {
    /// Stop the task. No further runs happen after this returns.
    fn cancel(&mut self);

    /// Whether the task may still run.
    fn is_active(&self) -> bool;
}

pub trait Scheduler {
    type Handle: TaskHandle;

    /// Run `task` every `period`, first after one full period.
    fn every(&self, period: Duration, task: RepeatingTask) -> Self::Handle;
}

// ── Tokio ────────────────────────────────────────────────────────────

/// Spawns each repeating task on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Scheduler on the runtime of the calling context, if any.
    pub fn from_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    type Handle = TokioTaskHandle;

    fn every(&self, period: Duration, task: RepeatingTask) -> Self::Handle {
        let mut task = task;
        let join = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if task().is_break() {
                    break;
                }
            }
        });
        TokioTaskHandle { join: Some(join) }
    }
}

/// Aborts the spawned task on cancel or drop.
#[derive(Debug)]
pub struct TokioTaskHandle {
    join: Option<JoinHandle<()>>,
}

impl TaskHandle for TokioTaskHandle {
    fn cancel(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }
}

impl Drop for TokioTaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ── Manual ───────────────────────────────────────────────────────────

struct ManualTask {
    period: Duration,
    elapsed: Duration,
    task: RepeatingTask,
    active: Arc<AtomicBool>,
}

/// Scheduler driven by explicit `advance` calls.
///
/// Clones share the same task list, so a test can keep one clone and hand
/// another to the code under test.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Arc<Mutex<Vec<ManualTask>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward, running every task whose period elapsed.
    ///
    /// Tasks run outside the internal lock, so they may schedule or cancel
    /// other tasks.
    pub fn advance(&self, by: Duration) {
        let mut tasks = std::mem::take(&mut *self.lock());

        for entry in tasks.iter_mut() {
            entry.elapsed += by;
            while entry.active.load(Ordering::SeqCst) && entry.elapsed >= entry.period {
                entry.elapsed -= entry.period;
                if (entry.task)().is_break() {
                    entry.active.store(false, Ordering::SeqCst);
                }
            }
        }

        let mut guard = self.lock();
        tasks.append(&mut guard);
        tasks.retain(|t| t.active.load(Ordering::SeqCst));
        *guard = tasks;
    }

    /// Advance by `n` one-second steps.
    pub fn advance_secs(&self, n: u64) {
        for _ in 0..n {
            self.advance(Duration::from_secs(1));
        }
    }

    /// Number of tasks still scheduled.
    pub fn active_tasks(&self) -> usize {
        self.lock()
            .iter()
            .filter(|t| t.active.load(Ordering::SeqCst))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ManualTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualTaskHandle;

    fn every(&self, period: Duration, task: RepeatingTask) -> Self::Handle {
        let active = Arc::new(AtomicBool::new(true));
        self.lock().push(ManualTask {
            period: period.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            task,
            active: Arc::clone(&active),
        });
        ManualTaskHandle { active }
    }
}

#[derive(Debug)]
pub struct ManualTaskHandle {
    active: Arc<AtomicBool>,
}

impl TaskHandle for ManualTaskHandle {
    fn cancel(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counter_task(count: &Arc<AtomicU32>, stop_at: u32) -> RepeatingTask {
        let count = Arc::clone(count);
        Box::new(move || {
            let n = count.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= stop_at {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    #[test]
    fn manual_runs_once_per_period() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicU32::new(0));
        let handle = scheduler.every(Duration::from_secs(1), counter_task(&count, u32::MAX));

        scheduler.advance(Duration::from_millis(500));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_millis(500));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        scheduler.advance_secs(3);
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert!(handle.is_active());
    }

    #[test]
    fn manual_cancel_stops_runs() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicU32::new(0));
        let mut handle = scheduler.every(Duration::from_secs(1), counter_task(&count, u32::MAX));
        scheduler.advance_secs(2);
        handle.cancel();
        scheduler.advance_secs(5);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn manual_task_can_stop_itself() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicU32::new(0));
        let handle = scheduler.every(Duration::from_secs(1), counter_task(&count, 3));
        scheduler.advance_secs(10);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_ticks_and_cancels() {
        let scheduler = TokioScheduler::from_current().unwrap();
        let count = Arc::new(AtomicU32::new(0));
        let mut handle = scheduler.every(Duration::from_secs(1), counter_task(&count, u32::MAX));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        handle.cancel();
        assert!(!handle.is_active());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_task_finishes_on_break() {
        let scheduler = TokioScheduler::from_current().unwrap();
        let count = Arc::new(AtomicU32::new(0));
        let handle = scheduler.every(Duration::from_secs(1), counter_task(&count, 2));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!handle.is_active());
    }
}
