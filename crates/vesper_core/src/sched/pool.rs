//! Worker pool and the idle barrier.

use std::any::Any;
use std::cell::Cell;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::config::SchedulerConfig;
use crate::error::{EcsError, EcsResult};

pub(super) type Task = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    static IS_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Returns `true` on a scheduler worker thread.
pub(super) fn on_worker_thread() -> bool {
    IS_WORKER.with(Cell::get)
}

struct QueueState {
    tasks: VecDeque<Task>,
    /// Tasks popped by a worker and not yet finished.
    active: usize,
    shutdown: bool,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.active == 0
    }
}

pub(super) struct Shared {
    state: Mutex<QueueState>,
    /// Signalled when a task is queued or shutdown starts.
    work_ready: Condvar,
    /// Signalled when the queue drains and the last task finishes.
    idle: Condvar,
    panicked: AtomicUsize,
}

impl Shared {
    pub(super) fn push(&self, task: Task) {
        let mut state = self.state.lock();
        state.tasks.push_back(task);
        drop(state);
        self.work_ready.notify_one();
    }
}

/// Fixed-size worker pool with a single "block until idle" barrier.
///
/// Tasks run in FIFO start order on whichever worker is free. A panicking task
/// is caught, logged and counted; the worker keeps serving the queue.
///
/// Dropping the scheduler finishes every queued task, then joins the workers.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = TaskScheduler::with_workers(4)?;
/// let counter = Arc::new(AtomicUsize::new(0));
/// for _ in 0..1000 {
///     let counter = Arc::clone(&counter);
///     scheduler.submit_task(move || { counter.fetch_add(1, Ordering::Relaxed); });
/// }
/// scheduler.wait_while_busy();
/// assert_eq!(counter.load(Ordering::Relaxed), 1000);
/// ```
pub struct TaskScheduler {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskScheduler {
    /// Creates a scheduler sized from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::WorkerSpawn`] if a worker thread cannot be started.
    pub fn new(config: &SchedulerConfig) -> EcsResult<Self> {
        Self::with_workers(config.resolved_worker_threads())
    }

    /// Creates a scheduler with exactly `worker_count` threads.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidConfig`] if `worker_count` is zero
    /// - [`EcsError::WorkerSpawn`] if a worker thread cannot be started
    pub fn with_workers(worker_count: usize) -> EcsResult<Self> {
        if worker_count == 0 {
            return Err(EcsError::InvalidConfig(
                "scheduler needs at least one worker".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                active: 0,
                shutdown: false,
            }),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
            panicked: AtomicUsize::new(0),
        });

        let mut scheduler = Self {
            shared,
            workers: Vec::with_capacity(worker_count),
        };

        for id in 0..worker_count {
            let shared = Arc::clone(&scheduler.shared);
            let handle = thread::Builder::new()
                .name(format!("vesper-worker-{id}"))
                .spawn(move || worker_loop(&shared))
                // Dropping `scheduler` here joins whatever already started
                .map_err(|e| EcsError::WorkerSpawn(e.to_string()))?;
            scheduler.workers.push(handle);
        }

        tracing::info!(workers = worker_count, "task scheduler started");
        Ok(scheduler)
    }

    /// Queues a task. Returns immediately.
    pub fn submit_task<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Box::new(task));
    }

    /// Blocks until the queue is empty and no task is running.
    ///
    /// Returns immediately if the scheduler is already idle. Tasks submitted
    /// from other threads while waiting extend the wait.
    ///
    /// # Panics
    ///
    /// Panics when called from inside a task, which would otherwise deadlock.
    pub fn wait_while_busy(&self) {
        assert!(
            !on_worker_thread(),
            "wait_while_busy called from a scheduler task"
        );

        let mut state = self.shared.state.lock();
        while !state.is_idle() {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Returns the number of worker threads.
    #[inline]
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of queued tasks not yet picked up by a worker.
    #[must_use]
    pub fn queued_task_count(&self) -> usize {
        self.shared.state.lock().tasks.len()
    }

    /// Returns how many tasks panicked since the last call, and resets the count.
    pub fn take_panicked_tasks(&self) -> usize {
        self.shared.panicked.swap(0, Ordering::AcqRel)
    }

    pub(super) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.work_ready.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("scheduler worker exited abnormally");
            }
        }
        tracing::debug!("task scheduler stopped");
    }
}

fn worker_loop(shared: &Shared) {
    IS_WORKER.with(|flag| flag.set(true));

    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if let Some(task) = state.tasks.pop_front() {
                    state.active += 1;
                    break task;
                }
                if state.shutdown {
                    return;
                }
                shared.work_ready.wait(&mut state);
            }
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            shared.panicked.fetch_add(1, Ordering::AcqRel);
            tracing::error!(
                thread = thread::current().name().unwrap_or("worker"),
                message = panic_message(payload.as_ref()),
                "scheduler task panicked"
            );
        }

        let mut state = shared.state.lock();
        state.active -= 1;
        if state.is_idle() {
            shared.idle.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            TaskScheduler::with_workers(0),
            Err(EcsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_wait_when_idle_returns() {
        let scheduler = TaskScheduler::with_workers(2).unwrap();
        scheduler.wait_while_busy();
        assert_eq!(scheduler.queued_task_count(), 0);
    }

    #[test]
    fn test_all_tasks_run_before_wait_returns() {
        let scheduler = TaskScheduler::with_workers(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..1000 {
            let counter = Arc::clone(&counter);
            scheduler.submit_task(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
        scheduler.wait_while_busy();

        assert_eq!(counter.load(Ordering::Relaxed), 1000);
    }

    #[test]
    fn test_wait_covers_running_task() {
        let scheduler = TaskScheduler::with_workers(1).unwrap();
        let done = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&done);
        scheduler.submit_task(move || {
            thread::sleep(Duration::from_millis(30));
            flag.store(true, Ordering::Release);
        });
        scheduler.wait_while_busy();

        assert!(done.load(Ordering::Acquire));
    }

    #[test]
    fn test_panicking_task_is_isolated() {
        let scheduler = TaskScheduler::with_workers(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.submit_task(|| panic!("boom"));
        let after = Arc::clone(&counter);
        scheduler.submit_task(move || {
            after.fetch_add(1, Ordering::Relaxed);
        });
        scheduler.wait_while_busy();

        assert_eq!(counter.load(Ordering::Relaxed), 1);
        assert_eq!(scheduler.take_panicked_tasks(), 1);
        assert_eq!(scheduler.take_panicked_tasks(), 0);
    }

    #[test]
    fn test_drop_finishes_queued_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let scheduler = TaskScheduler::with_workers(2).unwrap();
            for _ in 0..64 {
                let counter = Arc::clone(&counter);
                scheduler.submit_task(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
        }
        assert_eq!(counter.load(Ordering::Relaxed), 64);
    }

    #[test]
    fn test_worker_flag_is_set_inside_tasks() {
        let scheduler = TaskScheduler::with_workers(1).unwrap();
        let seen = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&seen);
        scheduler.submit_task(move || flag.store(on_worker_thread(), Ordering::Release));
        scheduler.wait_while_busy();

        assert!(seen.load(Ordering::Acquire));
        assert!(!on_worker_thread());
    }
}
