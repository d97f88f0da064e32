//! Incremental, completion-order consumption of a group of tasks.

use futures::future::select_all;

use crate::error::TaskResult;
use crate::task::Task;

/// Consumes `tasks` one completion at a time, in the order they finish.
///
/// Where [`all`](crate::all) hands back everything at once, a stream
/// surfaces each task as soon as it is done:
///
/// ```no_run
/// # async fn demo(tasks: Vec<task_await::Task<String, String>>) {
/// let mut completions = task_await::stream(tasks);
/// while completions.wait().await {
///     match completions.result() {
///         Some(Ok(value)) => println!("done: {value:?}"),
///         Some(Err(error)) => eprintln!("failed: {error}"),
///         None => unreachable!("wait returned true"),
///     }
/// }
/// # }
/// ```
pub fn stream<T, E>(tasks: Vec<Task<T, E>>) -> Stream<T, E> {
    Stream {
        remaining: tasks,
        current: None,
    }
}

/// Stateful view over a group of tasks, yielding them in completion
/// order. Built by [`stream`].
pub struct Stream<T, E> {
    remaining: Vec<Task<T, E>>,
    current: Option<Task<T, E>>,
}

impl<T, E> Stream<T, E> {
    /// Waits for the next task to complete, makes it current, and removes
    /// it from the remaining set.
    ///
    /// Returns `false`, immediately and forever, once every task has been
    /// surfaced. Each completed task is yielded exactly once, however the
    /// completions interleave.
    pub async fn wait(&mut self) -> bool {
        if self.remaining.is_empty() {
            return false;
        }
        let index = {
            let waits = self.remaining.iter().map(|task| Box::pin(task.wait()));
            let ((), index, _unfinished) = select_all(waits).await;
            index
        };
        self.current = Some(self.remaining.remove(index));
        true
    }

    /// The most recently surfaced task. `None` before the first
    /// [`Stream::wait`] returns `true`.
    #[must_use]
    pub fn task(&self) -> Option<&Task<T, E>> {
        self.current.as_ref()
    }

    /// Number of tasks not yet surfaced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// True once every task has been surfaced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl<T, E> Stream<T, E>
where
    T: Clone,
    E: Clone,
{
    /// Outcome of the most recently surfaced task, without blocking: the
    /// current task has already completed. `None` before the first
    /// [`Stream::wait`] returns `true`.
    #[must_use]
    pub fn result(&self) -> Option<TaskResult<T, E>> {
        self.current.as_ref().and_then(Task::try_result)
    }
}

impl<T, E> std::fmt::Debug for Stream<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("remaining", &self.remaining.len())
            .field("current", &self.current.as_ref().map(Task::id))
            .finish()
    }
}
