//! Consuming a group of tasks one completion at a time.

use std::time::Duration;

use task_await::{stream, Task};

fn fetch(name: &'static str, delay_ms: u64) -> Task<String, String> {
    Task::new(move |producer| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        producer.resolve(format!("{name} payload"));
    })
}

#[tokio::main]
async fn main() {
    let mut completions = stream(vec![
        fetch("foo", 300),
        fetch("bar", 100),
        fetch("baz", 200),
    ]);

    while completions.wait().await {
        match completions.result() {
            Some(Ok(Some(payload))) => println!("ready: {payload}"),
            Some(Ok(None)) => println!("a task finished without a payload"),
            Some(Err(error)) => eprintln!("a task failed: {error}"),
            None => unreachable!("wait returned true"),
        }
    }
    println!("all tasks consumed");
}
