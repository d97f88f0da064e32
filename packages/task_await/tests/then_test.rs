//! Deriving tasks from other tasks' outcomes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use task_await::{Task, TaskError};

#[tokio::test]
async fn then_feeds_the_resolved_value_forward() {
    let doubled = Task::<u32, String>::resolved(21).then(|value, producer| async move {
        producer.resolve(value.map_or(0, |v| v * 2));
    });
    assert_eq!(doubled.result().await, Ok(Some(42)));
}

#[tokio::test]
async fn then_chains_compose() {
    let length = Task::<String, String>::resolved("claire".to_owned())
        .then(|name, producer| async move {
            producer.resolve(format!("hello {}", name.unwrap_or_default()));
        })
        .then(|line, producer| async move {
            producer.resolve(line.map_or(0, |l| l.len()));
        });
    assert_eq!(length.result().await, Ok(Some("hello claire".len())));
}

#[tokio::test]
async fn a_failed_source_skips_the_continuation() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    let chained = Task::<u32, String>::rejected("boom".to_owned()).then(
        move |_value, producer| async move {
            flag.store(true, Ordering::SeqCst);
            producer.resolve(1);
        },
    );

    assert_eq!(
        chained.result().await,
        Err(TaskError::Rejected("boom".to_owned()))
    );
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn a_panicked_source_passes_its_error_through() {
    let source = Task::<u32, String>::new(|_producer| async move {
        panic!("upstream blew up");
    });
    let chained = source.then(|_value, producer| async move {
        producer.resolve(0);
    });

    match chained.result().await {
        Err(TaskError::Panicked(message)) => assert!(message.contains("upstream blew up")),
        other => panic!("expected the upstream panic, got {other:?}"),
    }
}

#[tokio::test]
async fn an_empty_source_hands_the_continuation_none() {
    let source = Task::<u32, String>::new(|_producer| async move {});
    let chained = source.then(|value, producer| async move {
        producer.resolve(value.is_none());
    });
    assert_eq!(chained.result().await, Ok(Some(true)));
}

#[tokio::test]
async fn then_waits_for_a_slow_source() {
    let source = Task::<u32, String>::new(|producer| async move {
        sleep(Duration::from_millis(20)).await;
        producer.resolve(5);
    });
    let chained = source.then(|value, producer| async move {
        producer.resolve(value.map_or(0, |v| v + 1));
    });
    assert_eq!(chained.result().await, Ok(Some(6)));
}

#[tokio::test]
async fn stopping_a_chained_task_releases_it_without_touching_the_source() {
    let source = Task::<u32, String>::new(|_producer| async move {
        std::future::pending::<()>().await;
    });
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    let chained = source.then(move |_value, producer| async move {
        flag.store(true, Ordering::SeqCst);
        producer.resolve(1);
    });

    chained.stop().await;

    assert_eq!(chained.result().await, Ok(None));
    assert!(!ran.load(Ordering::SeqCst));
    assert!(!source.stop_requested());
    assert!(!source.is_done());
}
