//! Scoped task submission.
//!
//! ## Safety Note
//!
//! Scoped tasks borrow from the caller's stack, so their boxes are widened to
//! `'static` before they enter the shared queue. Soundness rests on one rule:
//! [`TaskScheduler::scope`] does not return (or unwind) until every task spawned
//! through its [`TaskScope`] has finished.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::pool::{on_worker_thread, Shared, Task, TaskScheduler};

/// Counts the outstanding tasks of one scope.
struct ScopeLatch {
    pending: Mutex<usize>,
    done: Condvar,
}

impl ScopeLatch {
    fn wait(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.done.wait(&mut pending);
        }
    }
}

/// Decrements the latch when the task finishes, including by panic.
struct LatchRelease(Arc<ScopeLatch>);

impl Drop for LatchRelease {
    fn drop(&mut self) {
        let mut pending = self.0.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            self.0.done.notify_all();
        }
    }
}

/// Waits for the scope's tasks even when the scope body panics.
struct WaitOnDrop(Arc<ScopeLatch>);

impl Drop for WaitOnDrop {
    fn drop(&mut self) {
        self.0.wait();
    }
}

/// Handle for spawning tasks that may borrow from the enclosing stack frame.
///
/// Obtained from [`TaskScheduler::scope`].
pub struct TaskScope<'scope, 'env: 'scope> {
    shared: Arc<Shared>,
    latch: Arc<ScopeLatch>,
    scope: PhantomData<&'scope mut &'scope ()>,
    env: PhantomData<&'env mut &'env ()>,
}

impl<'scope> TaskScope<'scope, '_> {
    /// Queues a task on the scheduler.
    ///
    /// The task may borrow anything that outlives the scope.
    pub fn spawn<F>(&'scope self, task: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        *self.latch.pending.lock() += 1;

        let release = LatchRelease(Arc::clone(&self.latch));
        let task: Box<dyn FnOnce() + Send + 'scope> = Box::new(move || {
            let _release = release;
            task();
        });

        // SAFETY: only the lifetime changes. `TaskScheduler::scope` blocks
        // until the latch reaches zero, and the latch is released after the
        // closure (and everything it borrows) has been consumed.
        let task: Task = unsafe {
            std::mem::transmute::<Box<dyn FnOnce() + Send + 'scope>, Task>(task)
        };
        self.shared.push(task);
    }
}

impl TaskScheduler {
    /// Runs `body` with a scope whose tasks may borrow local data.
    ///
    /// Returns after `body` returns and every task it spawned has finished.
    /// Panics inside scoped tasks are isolated like any other task and show up
    /// in [`take_panicked_tasks`](Self::take_panicked_tasks).
    ///
    /// # Panics
    ///
    /// Panics when called from inside a task, which would otherwise deadlock.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut values = vec![1, 2, 3, 4];
    /// scheduler.scope(|s| {
    ///     for chunk in values.chunks_mut(2) {
    ///         s.spawn(move || chunk.iter_mut().for_each(|v| *v *= 10));
    ///     }
    /// });
    /// assert_eq!(values, vec![10, 20, 30, 40]);
    /// ```
    pub fn scope<'env, F, R>(&self, body: F) -> R
    where
        F: for<'scope> FnOnce(&'scope TaskScope<'scope, 'env>) -> R,
    {
        assert!(
            !on_worker_thread(),
            "TaskScheduler::scope called from a scheduler task"
        );

        let latch = Arc::new(ScopeLatch {
            pending: Mutex::new(0),
            done: Condvar::new(),
        });
        let scope = TaskScope {
            shared: Arc::clone(self.shared()),
            latch: Arc::clone(&latch),
            scope: PhantomData,
            env: PhantomData,
        };

        let _wait = WaitOnDrop(latch);
        body(&scope)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_scoped_tasks_borrow_locals() {
        let scheduler = TaskScheduler::with_workers(4).unwrap();
        let mut values: Vec<u32> = (0..100).collect();

        scheduler.scope(|s| {
            for chunk in values.chunks_mut(7) {
                s.spawn(move || chunk.iter_mut().for_each(|v| *v *= 2));
            }
        });

        assert!(values.iter().enumerate().all(|(i, v)| *v == 2 * i as u32));
    }

    #[test]
    fn test_scope_returns_body_value() {
        let scheduler = TaskScheduler::with_workers(2).unwrap();
        let hits = AtomicUsize::new(0);

        let spawned = scheduler.scope(|s| {
            for _ in 0..10 {
                s.spawn(|| {
                    hits.fetch_add(1, Ordering::Relaxed);
                });
            }
            10
        });

        assert_eq!(spawned, 10);
        assert_eq!(hits.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn test_scope_survives_task_panic() {
        let scheduler = TaskScheduler::with_workers(2).unwrap();
        let hits = AtomicUsize::new(0);

        scheduler.scope(|s| {
            s.spawn(|| panic!("scoped boom"));
            s.spawn(|| {
                hits.fetch_add(1, Ordering::Relaxed);
            });
        });

        assert_eq!(hits.load(Ordering::Relaxed), 1);
        assert_eq!(scheduler.take_panicked_tasks(), 1);
    }
}
