//! How group failures surface: every task runs, every failure is
//! reported with its position.

use std::time::Duration;

use task_await::{all, Task, TaskError};

fn flaky(name: &'static str, fails: bool) -> Task<String, String> {
    Task::new(move |producer| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if fails {
            producer.reject(format!("{name} hit a dead end"));
        } else {
            producer.resolve(format!("{name} ok"));
        }
    })
}

#[tokio::main]
async fn main() {
    let group = [flaky("a", false), flaky("b", true), flaky("c", true)];

    match all(&group).await {
        Ok(_) => println!("everything passed"),
        Err(TaskError::Failed { errors }) => {
            println!("{} task(s) failed:", errors.len());
            for failure in errors {
                println!("  {failure}");
            }
        }
        Err(error) => eprintln!("unexpected error shape: {error}"),
    }
}
