//! A long-running task winding down cooperatively when its result does
//! not arrive in time, taking its sub-task with it.

use std::time::Duration;

use task_await::{Task, TaskError};

fn child_loop() -> Task<u32, String> {
    Task::new(|producer| async move {
        loop {
            if producer.should_stop() {
                println!("child: stop requested, winding down");
                return;
            }
            println!("child: working");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
}

#[tokio::main]
async fn main() {
    let parent = Task::<u32, String>::new(|producer| async move {
        let child = child_loop();
        child.adopt_stop(producer.stop_token());
        loop {
            if producer.should_stop() {
                println!("parent: stop requested, waiting for the child");
                child.wait().await;
                return;
            }
            println!("parent: working");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    let outcome = parent
        .result_with_timeout(Duration::from_secs(1), Duration::from_millis(500))
        .await;
    match outcome {
        Ok(value) => println!("parent produced {value:?}"),
        Err(TaskError::ResultTimeout) => println!("gave up waiting; everything stopped cleanly"),
        Err(error) => eprintln!("failed: {error}"),
    }
}
