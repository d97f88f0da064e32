//! Bulk cooperative stop over groups of stoppable values.
//!
//! The helpers here are trait-based rather than task-specific, so anything
//! that can raise a stop signal and wait for quiescence can participate,
//! without `async_trait` machinery.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::TaskError;
use crate::task::Task;

/// Capability to request a cooperative stop and wait for it to land.
pub trait Stoppable {
    /// Raises the stop signal and resolves once the target has finished.
    fn stop(&self) -> impl Future<Output = ()> + Send;
}

/// Capability to request a cooperative stop with a bounded wait.
pub trait StoppableWithTimeout {
    /// What a bounded stop reports when the target does not wind down in
    /// time.
    type Error;

    /// Raises the stop signal, waiting at most `timeout` for the target
    /// to finish.
    fn stop_with_timeout(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl<T, E> Stoppable for Task<T, E>
where
    T: Send + Sync,
    E: Send + Sync,
{
    fn stop(&self) -> impl Future<Output = ()> + Send {
        Task::stop(self)
    }
}

impl<T, E> StoppableWithTimeout for Task<T, E>
where
    T: Send + Sync,
    E: Send + Sync,
{
    type Error = TaskError<E>;

    fn stop_with_timeout(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        Task::stop_with_timeout(self, timeout)
    }
}

/// Stops every member of `group` in turn, waiting for each one to finish
/// before moving to the next.
///
/// This is the cancellation policy the short-circuiting combinators apply
/// to their losers.
pub async fn stop_all<S: Stoppable>(group: &[S]) {
    for member in group {
        member.stop().await;
    }
}

/// Spawns [`stop_all`] as a background unit of work and returns
/// immediately.
///
/// Members may still be winding down when this returns; await the handle
/// to get the acknowledgement guarantee back.
pub fn stop_all_detached<S>(group: Vec<S>) -> JoinHandle<()>
where
    S: Stoppable + Send + Sync + 'static,
{
    tokio::spawn(async move {
        stop_all(&group).await;
    })
}

/// Stops every member of `group` with a bounded wait per member.
///
/// Returns the positions and errors of the members that did not finish in
/// time, in input order. An empty vector means the whole group stopped.
pub async fn stop_all_with_timeout<S>(timeout: Duration, group: &[S]) -> Vec<(usize, S::Error)>
where
    S: StoppableWithTimeout,
{
    let mut stragglers = Vec::new();
    for (index, member) in group.iter().enumerate() {
        if let Err(error) = member.stop_with_timeout(timeout).await {
            debug!("group member {index} did not stop within {timeout:?}");
            stragglers.push((index, error));
        }
    }
    stragglers
}
