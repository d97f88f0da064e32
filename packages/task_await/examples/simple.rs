//! Two workers running side by side, awaited as a group.

use std::time::{Duration, Instant};

use task_await::{all, Task};

fn worker(name: &'static str) -> Task<String, String> {
    Task::new(move |producer| async move {
        println!("{name}: starting");
        tokio::time::sleep(Duration::from_secs(1)).await;
        println!("{name}: finished");
        producer.resolve(format!("{name} report"));
    })
}

#[tokio::main]
async fn main() {
    let started = Instant::now();
    let group = [worker("alpha"), worker("bravo")];

    match all(&group).await {
        Ok(reports) => {
            for report in reports.into_iter().flatten() {
                println!("collected: {report}");
            }
        }
        Err(error) => eprintln!("some workers failed: {error}"),
    }

    println!("both done in {:?}", started.elapsed());
}
