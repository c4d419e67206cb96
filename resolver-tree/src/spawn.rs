//! Scheduling of element resolutions.
//!
//! Resolvers hand independent units of work to a [`TaskSpawner`] and never join them; the
//! execution that owns the spawner is the only one waiting for them.

use std::fmt;

use futures::future::BoxFuture;
use tokio_util::task::TaskTracker;

/// Runs fire-and-forget tasks for one execution.
pub trait TaskSpawner: Send + Sync + fmt::Debug {
    /// Schedule `task`. It must eventually run to completion unless the runtime shuts down.
    fn spawn(&self, task: BoxFuture<'static, ()>);

    /// Signal that the root resolution returned.
    ///
    /// Tasks may still be spawned afterwards by tasks already running.
    fn close(&self);

    /// Wait until the spawner is closed and every spawned task has completed.
    fn wait(&self) -> BoxFuture<'_, ()>;
}

/// Spawns on the current tokio runtime and keeps track of the spawned tasks.
#[derive(Clone, Debug, Default)]
pub struct TokioSpawner {
    tracker: TaskTracker,
}

impl TokioSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks spawned and not yet completed.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.tracker.spawn(task);
    }

    fn close(&self) {
        self.tracker.close();
    }

    fn wait(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.tracker.wait())
    }
}
