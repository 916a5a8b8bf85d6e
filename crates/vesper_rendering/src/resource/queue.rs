//! Per-category queue of work that must run on the context thread.

use crossbeam_channel::{Receiver, Sender};

use super::ResourceManager;
use crate::backend::GraphicsBackend;

/// Deferred work executed by [`ResourceManager::drain`].
pub(crate) type ContextTask<B> = Box<dyn FnOnce(&ResourceManager<B>) + Send>;

/// Multi-producer queue with a single consumer (the draining thread).
pub(crate) struct ContextQueue<B: GraphicsBackend> {
    sender: Sender<ContextTask<B>>,
    receiver: Receiver<ContextTask<B>>,
}

impl<B: GraphicsBackend> ContextQueue<B> {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Appends a task. Never blocks.
    pub(crate) fn push(&self, task: ContextTask<B>) {
        // Both ends live in `self`, so the channel cannot be disconnected here
        if self.sender.send(task).is_err() {
            tracing::error!("context queue disconnected, task dropped");
        }
    }

    pub(crate) fn pop(&self) -> Option<ContextTask<B>> {
        self.receiver.try_recv().ok()
    }

    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Drops every queued task without running it.
    pub(crate) fn discard(&self) -> usize {
        self.receiver.try_iter().count()
    }
}
