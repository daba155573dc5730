//! Worker execution context.
//!
//! Query execution and cursor iteration may block on I/O, so they run on the
//! blocking pool of a tokio runtime rather than on the task that polls (and
//! may cancel) the stream.

use brook_core::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Where queries run.
#[derive(Clone, Debug)]
pub struct WorkerContext {
    handle: Handle,
}

impl WorkerContext {
    /// Runs jobs on the blocking pool of the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Like `current`, but reports a missing runtime as an error.
    pub fn try_current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::worker(e.to_string()))
    }

    /// Returns the runtime handle.
    #[inline]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Runs a blocking job.
    pub fn spawn<F, R>(&self, job: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.spawn_blocking(job)
    }
}

/// Cooperative cancellation flag shared between a stream and its worker job.
///
/// The stream sets it when dropped; the job checks it at row boundaries.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    /// Creates a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Never blocks.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once `cancel` has been called on any clone.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
