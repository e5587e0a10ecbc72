use boundpool::{run_thread_per_task, BoxedTask, ThreadPoolBuilder};
use rand::Rng;
use std::time::Instant;

fn cpu_task(n: u64) -> u64 {
    (0..n).map(|x| x * x).sum()
}

fn tasks(num_tasks: usize) -> Vec<BoxedTask> {
    let mut rng = rand::thread_rng();
    (0..num_tasks)
        .map(|_| {
            let n = rng.gen_range(1_000..=20_000);
            Box::new(move || {
                let _ = cpu_task(n);
            }) as BoxedTask
        })
        .collect()
}

fn main() {
    let num_threads = 12;
    let num_tasks = 20_000;

    for capacity in [16, 1_024] {
        let pool_start = Instant::now();
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .queue_capacity(capacity)
            .build()
            .expect("valid pool configuration");

        for task in tasks(num_tasks) {
            pool.submit(task).unwrap();
        }
        pool.shutdown_graceful().unwrap();

        println!(
            "Time taken with thread pool (queue capacity {}): {:.2?}",
            capacity,
            pool_start.elapsed()
        );
    }

    let traditional_start = Instant::now();
    run_thread_per_task(tasks(num_tasks));
    println!(
        "Time taken with one thread per task: {:.2?}",
        traditional_start.elapsed()
    );
}
