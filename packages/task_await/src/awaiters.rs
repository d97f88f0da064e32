//! Combinators for awaiting groups of tasks.
//!
//! Three families, each in plain, fast, and bounded form:
//!
//! * [`all`] waits for everything and aggregates failures.
//! * [`all_or_error`] waits for everything but aborts the batch on the
//!   first failure.
//! * [`any`] takes the first completion, success or failure.
//!
//! Whenever a combinator returns before every input has completed, it
//! stops the losers rather than leaking them. The fast variants hand that
//! stop broadcast to a background unit of work; the `_with_timeout`
//! variants bound how long each loser gets.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::error::{Failure, TaskError, TaskResult};
use crate::stop::{stop_all, stop_all_detached, stop_all_with_timeout};
use crate::task::Task;

/// How a short-circuiting combinator asks its losers to stop.
enum StopMode {
    /// Stop every task and wait for each acknowledgement.
    Wait,
    /// Broadcast the stop in the background and return immediately.
    Detached,
    /// Stop every task, waiting at most this long per task.
    Bounded(Duration),
}

/// Waits for every task and returns their values in input order.
///
/// Unlike [`all_or_error`], failures never interrupt the batch: every task
/// is awaited to completion, and the failures are reported together at the
/// end, tagged with their input positions.
///
/// An empty slice yields `Ok` with an empty vector.
///
/// # Errors
///
/// [`TaskError::Failed`] aggregating one [`Failure`] per failed task.
pub async fn all<T, E>(tasks: &[Task<T, E>]) -> Result<Vec<Option<T>>, TaskError<E>>
where
    T: Clone,
    E: Clone,
{
    let mut values = Vec::with_capacity(tasks.len());
    let mut errors = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        match task.result().await {
            Ok(value) => values.push(value),
            Err(error) => errors.push(Failure { index, error }),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        debug!("{} of {} awaited tasks failed", errors.len(), tasks.len());
        Err(TaskError::Failed { errors })
    }
}

/// Waits for every task, aborting the batch on the first failure.
///
/// On success the values come back in input order regardless of
/// completion order. On the first failure the remaining tasks are stopped,
/// each acknowledgement is awaited, and the triggering error is returned
/// as-is.
///
/// An empty slice yields `Ok` with an empty vector.
///
/// # Errors
///
/// The first failing task's error, verbatim.
pub async fn all_or_error<T, E>(tasks: &[Task<T, E>]) -> Result<Vec<Option<T>>, TaskError<E>>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    gather_or_first_error(StopMode::Wait, tasks).await
}

/// [`all_or_error`] that does not wait for the losing tasks to stop.
///
/// On failure the error comes back immediately and the stop broadcast
/// runs in the background, so late losers may still be winding down while
/// the caller moves on.
///
/// # Errors
///
/// The first failing task's error, verbatim.
pub async fn fast_all_or_error<T, E>(tasks: &[Task<T, E>]) -> Result<Vec<Option<T>>, TaskError<E>>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    gather_or_first_error(StopMode::Detached, tasks).await
}

/// [`all_or_error`] with a bounded wait on each losing task's stop.
///
/// Losers that ignore the stop past `stop_timeout` are abandoned (still
/// running) rather than waited on forever.
///
/// # Errors
///
/// The first failing task's error, verbatim.
pub async fn all_or_error_with_timeout<T, E>(
    stop_timeout: Duration,
    tasks: &[Task<T, E>],
) -> Result<Vec<Option<T>>, TaskError<E>>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    gather_or_first_error(StopMode::Bounded(stop_timeout), tasks).await
}

/// Returns the first completion, success or failure, and stops the rest.
///
/// Every losing task is stopped and its acknowledgement awaited before
/// the winning outcome is returned.
///
/// # Errors
///
/// The winning task's error, when the first completion is a failure.
///
/// # Panics
///
/// Panics on an empty slice: "first of nothing" has no meaningful answer.
pub async fn any<T, E>(tasks: &[Task<T, E>]) -> TaskResult<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    first_outcome(StopMode::Wait, tasks).await
}

/// [`any`] that does not wait for the losing tasks to stop.
///
/// # Errors
///
/// The winning task's error, when the first completion is a failure.
///
/// # Panics
///
/// Panics on an empty slice.
pub async fn fast_any<T, E>(tasks: &[Task<T, E>]) -> TaskResult<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    first_outcome(StopMode::Detached, tasks).await
}

/// [`any`] with a bounded wait on each losing task's stop.
///
/// # Errors
///
/// The winning task's error, when the first completion is a failure.
///
/// # Panics
///
/// Panics on an empty slice.
pub async fn any_with_timeout<T, E>(
    stop_timeout: Duration,
    tasks: &[Task<T, E>],
) -> TaskResult<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    first_outcome(StopMode::Bounded(stop_timeout), tasks).await
}

async fn gather_or_first_error<T, E>(
    stop_mode: StopMode,
    tasks: &[Task<T, E>],
) -> Result<Vec<Option<T>>, TaskError<E>>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    let mut waits: FuturesUnordered<_> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| async move { (index, task.result().await) })
        .collect();

    let mut completed: Vec<(usize, Option<T>)> = Vec::with_capacity(tasks.len());
    while let Some((index, outcome)) = waits.next().await {
        match outcome {
            Ok(value) => completed.push((index, value)),
            Err(error) => {
                debug!("aborting batch: task at position {index} failed");
                drop(waits);
                broadcast_stop(stop_mode, tasks).await;
                return Err(error);
            }
        }
    }

    // Completion order back to input order.
    completed.sort_by_key(|(index, _)| *index);
    Ok(completed.into_iter().map(|(_, value)| value).collect())
}

async fn first_outcome<T, E>(stop_mode: StopMode, tasks: &[Task<T, E>]) -> TaskResult<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    assert!(!tasks.is_empty(), "any of an empty set of tasks");

    let mut waits: FuturesUnordered<_> = tasks.iter().map(Task::result).collect();
    let outcome = waits.next().await.unwrap_or(Ok(None));
    drop(waits);
    broadcast_stop(stop_mode, tasks).await;
    outcome
}

async fn broadcast_stop<T, E>(mode: StopMode, tasks: &[Task<T, E>])
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    match mode {
        StopMode::Wait => stop_all(tasks).await,
        StopMode::Detached => {
            drop(stop_all_detached(tasks.to_vec()));
        }
        StopMode::Bounded(timeout) => {
            for (index, _) in stop_all_with_timeout(timeout, tasks).await {
                warn!("abandoned task at position {index}: stop unacknowledged after {timeout:?}");
            }
        }
    }
}
