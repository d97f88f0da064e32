//! Deriving tasks from other tasks' outcomes with `then`.

use std::time::Duration;

use task_await::{all_or_error, Task};

fn lookup_name(id: u32) -> Task<String, String> {
    Task::new(move |producer| async move {
        tokio::time::sleep(Duration::from_millis(50 * u64::from(id))).await;
        producer.resolve(format!("user-{id}"));
    })
}

#[tokio::main]
async fn main() {
    let greetings: Vec<_> = (1..=3u32)
        .map(|id| {
            lookup_name(id).then(|name, producer| async move {
                producer.resolve(format!("hello, {}!", name.unwrap_or_default()));
            })
        })
        .collect();

    match all_or_error(&greetings).await {
        Ok(lines) => {
            for line in lines.into_iter().flatten() {
                println!("{line}");
            }
        }
        Err(error) => eprintln!("greeting failed: {error}"),
    }
}
