//! Promise-style asynchronous tasks with cooperative stop, layered
//! timeouts, and combinators for awaiting groups of tasks.
//!
//! A [`Task`] starts running the moment it is created and settles exactly
//! once: resolved with a value, rejected with an error, or empty when the
//! body finishes without saying anything. Handles are cheap to clone and
//! the outcome can be awaited any number of times. Cancellation is
//! cooperative throughout: [`Task::stop`] raises a request that the body
//! observes through its [`Producer`]; nothing is ever killed mid-flight.
//!
//! ```
//! use std::time::Duration;
//!
//! use task_await::{all_or_error, Task};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let slow = Task::<u32, String>::new(|producer| async move {
//!         tokio::time::sleep(Duration::from_millis(20)).await;
//!         producer.resolve(42);
//!     });
//!     let quick = Task::new(|producer| async move {
//!         producer.resolve(7);
//!     });
//!
//!     // Both run concurrently; values come back in input order.
//!     let values = all_or_error(&[slow, quick]).await;
//!     assert_eq!(values, Ok(vec![Some(42), Some(7)]));
//! }
//! ```
//!
//! The combinators in [`awaiters`] cover the common group shapes: wait
//! for everything ([`all`]), abort the batch on the first failure
//! ([`all_or_error`]), or take the first completion ([`any`]). Their fast
//! and `_with_timeout` variants trade how long the losing tasks are given
//! to stop. [`stream()`] consumes a group incrementally in completion
//! order, and the [`stop`] module stops whole groups of anything
//! implementing [`Stoppable`].

#![forbid(unsafe_code)]

pub mod awaiters;
pub mod error;
pub mod producer;
pub mod stop;
pub mod stream;
pub mod task;

pub use awaiters::{
    all, all_or_error, all_or_error_with_timeout, any, any_with_timeout, fast_all_or_error,
    fast_any,
};
pub use error::{Failure, TaskError, TaskResult};
pub use producer::Producer;
pub use stop::{
    stop_all, stop_all_detached, stop_all_with_timeout, Stoppable, StoppableWithTimeout,
};
pub use stream::{stream, Stream};
pub use task::{Task, TaskId};

// Re-exported so stop-signal interop never forces a direct tokio-util
// dependency on callers.
pub use tokio_util::sync::CancellationToken;
