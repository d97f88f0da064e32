//! Group combinators: all, all_or_error, any, and their fast and bounded
//! variants.

use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};

use task_await::{
    all, all_or_error, all_or_error_with_timeout, any, any_with_timeout, fast_all_or_error,
    fast_any, Task, TaskError,
};

fn worker(value: u32, delay: Duration) -> Task<u32, String> {
    Task::new(move |producer| async move {
        sleep(delay).await;
        producer.resolve(value);
    })
}

fn failing(message: &str, delay: Duration) -> Task<u32, String> {
    let message = message.to_owned();
    Task::new(move |producer| async move {
        sleep(delay).await;
        producer.reject(message);
    })
}

/// Runs until stopped, polling every 25ms; completes empty.
fn poller() -> Task<u32, String> {
    Task::new(|producer| async move {
        loop {
            if producer.should_stop() {
                return;
            }
            sleep(Duration::from_millis(25)).await;
        }
    })
}

/// Sleeps for five minutes and never looks at the stop request.
fn stubborn() -> Task<u32, String> {
    Task::new(|_producer| async move {
        sleep(Duration::from_secs(300)).await;
    })
}

#[tokio::test(start_paused = true)]
async fn all_returns_values_in_input_order() {
    let group = [
        worker(1, Duration::from_millis(80)),
        worker(2, Duration::from_millis(40)),
        worker(3, Duration::from_millis(10)),
    ];
    assert_eq!(all(&group).await, Ok(vec![Some(1), Some(2), Some(3)]));
}

#[tokio::test(start_paused = true)]
async fn all_waits_for_everything_and_aggregates_failures() {
    let group = [
        worker(1, Duration::from_millis(10)),
        failing("first", Duration::from_millis(30)),
        worker(2, Duration::from_millis(20)),
        failing("second", Duration::from_millis(5)),
    ];

    match all(&group).await.unwrap_err() {
        TaskError::Failed { errors } => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].index, 1);
            assert_eq!(errors[0].error, TaskError::Rejected("first".to_owned()));
            assert_eq!(errors[1].index, 3);
            assert_eq!(errors[1].error, TaskError::Rejected("second".to_owned()));
        }
        other => panic!("expected an aggregate failure, got {other:?}"),
    }

    // Nothing was stopped early; every task ran to completion.
    assert!(group.iter().all(Task::is_done));
    assert!(!group.iter().any(Task::stop_requested));
}

#[tokio::test]
async fn all_of_nothing_is_ok() {
    assert_eq!(all::<u32, String>(&[]).await, Ok(vec![]));
    assert_eq!(all_or_error::<u32, String>(&[]).await, Ok(vec![]));
}

#[tokio::test(start_paused = true)]
async fn all_or_error_reorders_completions_back_to_input_order() {
    let group = [
        worker(1, Duration::from_millis(100)),
        worker(2, Duration::from_millis(50)),
        worker(3, Duration::from_millis(10)),
    ];
    assert_eq!(
        all_or_error(&group).await,
        Ok(vec![Some(1), Some(2), Some(3)])
    );
}

#[tokio::test(start_paused = true)]
async fn all_or_error_short_circuits_and_stops_the_losers() {
    let losers = [poller(), poller()];
    let group = [
        losers[0].clone(),
        failing("boom", Duration::from_millis(20)),
        losers[1].clone(),
    ];

    let started = Instant::now();
    let error = all_or_error(&group).await.unwrap_err();

    assert_eq!(error, TaskError::Rejected("boom".to_owned()));
    for loser in &losers {
        assert!(loser.stop_requested());
        assert!(loser.is_done());
    }
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn fast_all_or_error_does_not_wait_for_acknowledgements() {
    let loser = poller();
    let group = [loser.clone(), failing("boom", Duration::from_millis(10))];

    let error = fast_all_or_error(&group).await.unwrap_err();
    assert_eq!(error, TaskError::Rejected("boom".to_owned()));

    // The detached broadcast catches up shortly after.
    timeout(Duration::from_secs(1), loser.wait())
        .await
        .expect("loser was never stopped");
    assert!(loser.stop_requested());
}

#[tokio::test(start_paused = true)]
async fn all_or_error_with_timeout_abandons_stubborn_losers() {
    let abandoned = stubborn();
    let group = [abandoned.clone(), failing("boom", Duration::from_millis(10))];

    let started = Instant::now();
    let error = all_or_error_with_timeout(Duration::from_millis(100), &group)
        .await
        .unwrap_err();

    assert_eq!(error, TaskError::Rejected("boom".to_owned()));
    let elapsed = started.elapsed();
    assert!(elapsed < Duration::from_secs(2), "waited on an abandoned task: {elapsed:?}");
    assert!(abandoned.stop_requested());
    assert!(!abandoned.is_done());
}

#[tokio::test(start_paused = true)]
async fn any_returns_the_first_success_and_stops_the_rest() {
    let quick = worker(7, Duration::from_millis(10));
    let slow = poller();

    let outcome = any(&[quick.clone(), slow.clone()]).await;

    assert_eq!(outcome, Ok(Some(7)));
    assert!(quick.is_done());
    assert!(slow.stop_requested());
    assert!(slow.is_done());
}

#[tokio::test(start_paused = true)]
async fn any_surfaces_the_first_error() {
    let group = [
        failing("fast failure", Duration::from_millis(10)),
        worker(1, Duration::from_millis(500)),
    ];
    assert_eq!(
        any(&group).await,
        Err(TaskError::Rejected("fast failure".to_owned()))
    );
}

#[tokio::test(start_paused = true)]
async fn fast_any_returns_without_waiting_on_losers() {
    let loser = poller();
    let outcome = fast_any(&[worker(3, Duration::from_millis(10)), loser.clone()]).await;

    assert_eq!(outcome, Ok(Some(3)));
    timeout(Duration::from_secs(1), loser.wait())
        .await
        .expect("loser was never stopped");
}

#[tokio::test(start_paused = true)]
async fn any_with_timeout_abandons_stubborn_losers() {
    let abandoned = stubborn();
    let group = [worker(5, Duration::from_millis(10)), abandoned.clone()];

    let started = Instant::now();
    let outcome = any_with_timeout(Duration::from_millis(50), &group).await;

    assert_eq!(outcome, Ok(Some(5)));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!abandoned.is_done());
}

#[tokio::test]
#[should_panic(expected = "any of an empty set of tasks")]
async fn any_of_nothing_panics() {
    let _ = any::<u32, String>(&[]).await;
}
