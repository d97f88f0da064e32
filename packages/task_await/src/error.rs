//! Error taxonomy for tasks and the await combinators

use thiserror::Error;

/// The recorded outcome of a task.
///
/// `Ok(Some(value))` for a resolved task, `Ok(None)` when the body returned
/// without resolving or rejecting (the empty outcome), `Err(..)` for a
/// rejected task.
pub type TaskResult<T, E> = Result<Option<T>, TaskError<E>>;

/// Errors surfaced by tasks and combinators, layered over the body's own
/// error type `E`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError<E> {
    /// The task body rejected with its own error value.
    #[error("task rejected: {0}")]
    Rejected(E),

    /// The task body panicked; the payload was captured at the execution
    /// boundary and recorded as this rejection.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task did not produce a result within the run timeout, but did
    /// acknowledge the stop request issued afterwards.
    #[error("result took too long to be returned")]
    ResultTimeout,

    /// A stop request was not acknowledged within the stop timeout. The
    /// task keeps running; cancellation is cooperative only.
    #[error("stopping task took too long to stop")]
    StoppingTimeout,

    /// One or more tasks in an awaited batch failed.
    #[error("{} awaited task(s) failed", .errors.len())]
    Failed {
        /// The individual failures, each tagged with the position of the
        /// task in the awaited input.
        errors: Vec<Failure<E>>,
    },
}

impl<E> TaskError<E> {
    /// The explicit rejection value, when that is what this error carries.
    #[must_use]
    pub fn rejection(&self) -> Option<&E> {
        match self {
            Self::Rejected(error) => Some(error),
            _ => None,
        }
    }

    /// True for either timeout kind.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ResultTimeout | Self::StoppingTimeout)
    }
}

/// A single failed task inside [`TaskError::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task at position {index}: {error}")]
pub struct Failure<E> {
    /// Zero-based position of the failed task in the awaited input.
    pub index: usize,
    /// What the task failed with.
    pub error: TaskError<E>,
}
