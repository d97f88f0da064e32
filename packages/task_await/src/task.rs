//! The task primitive: spawn-on-create handles over a write-once result
//! slot, with layered timeouts and cooperative stop.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::error::{TaskError, TaskResult};
use crate::producer::Producer;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a task, unique within the process.
///
/// Two handles compare equal exactly when they refer to the same task, so
/// callers can correlate handles yielded by a [`Stream`](crate::Stream)
/// back to the tasks they put in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        Self(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// State shared between a task's handles and its producer.
pub(crate) struct Inner<T, E> {
    /// Write-once result slot. Still unset when the completion signal
    /// fires means the body finished without resolving or rejecting.
    pub(crate) slot: OnceLock<TaskResult<T, E>>,
    /// Raised exactly once, after the slot can no longer change.
    pub(crate) done: CancellationToken,
    /// The cooperative stop request. Raising it is advice to the body,
    /// never preemption.
    pub(crate) stop: CancellationToken,
}

/// Handle to one asynchronous unit of work.
///
/// A task starts running the moment it is created and completes exactly
/// once, with a value, an error, or nothing at all. The handle is cheap to
/// clone; every clone observes the same task. Dropping all handles does
/// not cancel the work.
///
/// Waiting is repeatable: [`Task::result`] can be called any number of
/// times, from any number of clones, and always returns the same recorded
/// outcome.
pub struct Task<T, E> {
    id: TaskId,
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for Task<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> PartialEq for Task<T, E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T, E> Eq for Task<T, E> {}

impl<T, E> std::fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("done", &self.inner.done.is_cancelled())
            .field("stop_requested", &self.inner.stop.is_cancelled())
            .finish()
    }
}

impl<T, E> Task<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Spawns `body` onto the runtime immediately and returns the handle
    /// without blocking.
    ///
    /// The body speaks through its [`Producer`]: resolve or reject at most
    /// once, and poll [`Producer::should_stop`] at safe points in long
    /// loops. A body that returns without resolving completes the task
    /// with the empty outcome `Ok(None)`.
    ///
    /// A panicking body is caught at the task boundary and recorded as
    /// [`TaskError::Panicked`], so waiters are never left hanging and the
    /// panic never tears down neighbouring tasks.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, as `tokio::spawn` does.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Producer<T, E>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = TaskId::next();
        let inner = Arc::new(Inner {
            slot: OnceLock::new(),
            done: CancellationToken::new(),
            stop: CancellationToken::new(),
        });
        let producer = Producer::new(Arc::clone(&inner));
        let runner = Arc::clone(&inner);
        trace!("{id}: spawned");
        tokio::spawn(async move {
            // Construction panics in the closure land at the same
            // boundary as panics in the body itself.
            let caught = AssertUnwindSafe(async move { body(producer).await }).catch_unwind();
            if let Err(payload) = caught.await {
                let message = panic_message(payload.as_ref());
                error!("{id}: body panicked: {message}");
                if runner.slot.set(Err(TaskError::Panicked(message))).is_err() {
                    debug!("{id}: panicked after the result slot was already written");
                }
            }
            // The slot is settled for good from here on.
            runner.done.cancel();
            trace!("{id}: completed");
        });
        Self { id, inner }
    }

    /// Derives a new task from this one's outcome.
    ///
    /// The returned task waits for this task, then runs `continuation`
    /// with the resolved value (`None` for the empty outcome) and a fresh
    /// producer. When this task fails, the error is recorded on the
    /// derived task verbatim and the continuation never runs. Stopping the
    /// derived task while it is still waiting completes it empty without
    /// disturbing this task.
    pub fn then<U, F, Fut>(&self, continuation: F) -> Task<U, E>
    where
        T: Clone,
        E: Clone,
        U: Send + Sync + 'static,
        F: FnOnce(Option<T>, Producer<U, E>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let source = self.clone();
        Task::new(move |producer| async move {
            let outcome = tokio::select! {
                () = producer.stopped() => return,
                outcome = source.result() => outcome,
            };
            match outcome {
                Ok(value) => continuation(value, producer).await,
                Err(error) => producer.record(error),
            }
        })
    }
}

impl<T, E> Task<T, E> {
    /// Returns an already-resolved task. Nothing is spawned; the result
    /// is available immediately.
    #[must_use]
    pub fn resolved(value: T) -> Self {
        Self::pre_completed(Ok(Some(value)))
    }

    /// Returns an already-rejected task. Nothing is spawned.
    #[must_use]
    pub fn rejected(error: E) -> Self {
        Self::pre_completed(Err(TaskError::Rejected(error)))
    }

    fn pre_completed(outcome: TaskResult<T, E>) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(outcome);
        let inner = Inner {
            slot,
            done: CancellationToken::new(),
            stop: CancellationToken::new(),
        };
        inner.done.cancel();
        Self {
            id: TaskId::next(),
            inner: Arc::new(inner),
        }
    }

    /// Identity of this task, shared by all of its clones.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// True once the completion signal has fired and the outcome can no
    /// longer change.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.inner.done.is_cancelled()
    }

    /// True once a cooperative stop has been requested, whether or not
    /// the body has acknowledged it yet.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.inner.stop.is_cancelled()
    }

    /// Waits for completion without observing the outcome.
    ///
    /// Unlike [`Task::result`] this places no bounds on `T` or `E`, so it
    /// suits callers that only care about quiescence.
    pub async fn wait(&self) {
        self.inner.done.cancelled().await;
    }

    /// Requests a cooperative stop and waits for the task to finish.
    ///
    /// Bodies that never poll [`Producer::should_stop`] run to completion
    /// and keep this call waiting alongside them. Idempotent: safe to
    /// call repeatedly, concurrently, or on a task that already finished.
    pub async fn stop(&self) {
        self.inner.stop.cancel();
        self.inner.done.cancelled().await;
    }

    /// Same as [`Task::stop`] with a bounded wait.
    ///
    /// Completing normally within the window also counts as stopped.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoppingTimeout`] when the completion signal
    /// has not fired within `timeout`. The task keeps running either way;
    /// there is no forced termination in this model.
    pub async fn stop_with_timeout(&self, timeout: Duration) -> Result<(), TaskError<E>> {
        self.inner.stop.cancel();
        match tokio::time::timeout(timeout, self.inner.done.cancelled()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                debug!("{}: stop not acknowledged within {timeout:?}", self.id);
                Err(TaskError::StoppingTimeout)
            }
        }
    }

    /// Chains an external stop signal into this task: when `token` is
    /// cancelled, this task sees its own stop request raised.
    ///
    /// The forwarder exits on its own once this task completes, so the
    /// token's owner is never kept alive or waited on. This is how a task
    /// that spawns sub-tasks passes its [`Producer::stop_token`] down.
    pub fn adopt_stop(&self, token: CancellationToken) {
        let stop = self.inner.stop.clone();
        let done = self.inner.done.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => stop.cancel(),
                () = done.cancelled() => {}
            }
        });
    }
}

impl<T, E> Task<T, E>
where
    T: Clone,
    E: Clone,
{
    /// Waits for completion and returns the recorded outcome.
    ///
    /// Repeatable: every call, from any clone of the handle, returns the
    /// same outcome.
    ///
    /// # Errors
    ///
    /// Whatever the task recorded: [`TaskError::Rejected`] for an explicit
    /// rejection or [`TaskError::Panicked`] for a body that panicked.
    pub async fn result(&self) -> TaskResult<T, E> {
        self.inner.done.cancelled().await;
        self.outcome()
    }

    /// Non-blocking peek at the outcome. `None` while the task is still
    /// running.
    #[must_use]
    pub fn try_result(&self) -> Option<TaskResult<T, E>> {
        self.is_done().then(|| self.outcome())
    }

    /// Waits up to `run_timeout` for the outcome; past that, requests a
    /// cooperative stop and gives the task `stop_timeout` to wind down.
    ///
    /// # Errors
    ///
    /// [`TaskError::ResultTimeout`] when the task overran `run_timeout`
    /// but acknowledged the stop within `stop_timeout`, and
    /// [`TaskError::StoppingTimeout`] when it acknowledged neither.
    /// Otherwise whatever the completed task recorded, as in
    /// [`Task::result`].
    pub async fn result_with_timeout(
        &self,
        run_timeout: Duration,
        stop_timeout: Duration,
    ) -> TaskResult<T, E> {
        match tokio::time::timeout(run_timeout, self.inner.done.cancelled()).await {
            Ok(()) => self.outcome(),
            Err(_) => {
                debug!("{}: no result within {run_timeout:?}, requesting stop", self.id);
                self.stop_with_timeout(stop_timeout).await?;
                Err(TaskError::ResultTimeout)
            }
        }
    }

    fn outcome(&self) -> TaskResult<T, E> {
        self.inner.slot.get().cloned().unwrap_or(Ok(None))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
