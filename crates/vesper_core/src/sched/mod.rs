//! # Task Scheduler
//!
//! A fixed pool of worker threads fed from one FIFO queue, plus the helpers
//! systems use to fan work out across it.
//!
//! ## Frame Flow
//!
//! ```text
//! system ──submit──> [ queue ] ──> worker 0..N
//!    │                                  │
//!    └──── wait_while_busy() <── idle ──┘
//! ```
//!
//! There is exactly one barrier: `wait_while_busy` blocks until the queue is
//! empty and no task is running. [`TaskScheduler::scope`] adds a per-call
//! barrier that lets tasks borrow from the caller's stack.

mod buckets;
mod pool;
mod scope;

pub use buckets::bucket_ranges;
pub use pool::TaskScheduler;
pub use scope::TaskScope;
