//! The write capability handed to a task's body.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TaskError;
use crate::task::Inner;

/// Write half of a task, owned exclusively by the task's body.
///
/// A producer settles the result slot at most once and observes the
/// cooperative stop request. It is deliberately not `Clone`: one body,
/// one writer.
pub struct Producer<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Producer<T, E> {
    pub(crate) fn new(inner: Arc<Inner<T, E>>) -> Self {
        Self { inner }
    }

    /// Records `value` as the success outcome.
    ///
    /// First write wins the slot; a duplicate resolve, or a resolve after
    /// a reject, is logged and ignored.
    pub fn resolve(&self, value: T) {
        if self.inner.slot.set(Ok(Some(value))).is_err() {
            debug!("resolve ignored: result slot already written");
        }
    }

    /// Records `error` as the failure outcome, with the same first-write-
    /// wins discipline as [`Producer::resolve`].
    pub fn reject(&self, error: E) {
        self.record(TaskError::Rejected(error));
    }

    /// Records an already-layered error, preserving its exact shape.
    pub(crate) fn record(&self, error: TaskError<E>) {
        if self.inner.slot.set(Err(error)).is_err() {
            debug!("reject ignored: result slot already written");
        }
    }

    /// Non-blocking: has this task been asked to stop?
    ///
    /// Long-running bodies poll this at every safe point and wind down
    /// promptly when it turns true. Nothing enforces it; a body that never
    /// checks simply cannot be stopped early.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.inner.stop.is_cancelled()
    }

    /// Resolves once a stop is requested, never otherwise. The awaitable
    /// twin of [`Producer::should_stop`] for `select!`-shaped bodies.
    pub async fn stopped(&self) {
        self.inner.stop.cancelled().await;
    }

    /// A clone of this task's stop signal, for handing down to sub-tasks
    /// (see [`Task::adopt_stop`](crate::Task::adopt_stop)) or to any other
    /// cancellation-aware API.
    #[must_use]
    pub fn stop_token(&self) -> CancellationToken {
        self.inner.stop.clone()
    }
}

impl<T, E> std::fmt::Debug for Producer<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("settled", &self.inner.slot.get().is_some())
            .field("should_stop", &self.inner.stop.is_cancelled())
            .finish()
    }
}
