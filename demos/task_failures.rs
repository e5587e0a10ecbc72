//! Tasks that panic are reported through the error hook; the workers keep going.

use boundpool::{
    log_metrics,
    metrics::{AtomicMetricsCollector, ThreadPoolMetrics},
    ThreadPoolBuilder,
};
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Keep the default hook from printing every panic twice.
    std::panic::set_hook(Box::new(|_| {}));

    let metrics = Arc::new(ThreadPoolMetrics::new());
    let pool = ThreadPoolBuilder::new()
        .num_threads(2)
        .queue_capacity(4)
        .thread_name("fragile")
        .with_metrics_collector(Arc::new(AtomicMetricsCollector::new(metrics.clone())))
        .on_task_error(|failure| {
            tracing::warn!(
                worker = failure.worker_id(),
                thread = failure.thread_name().unwrap_or("?"),
                "caught: {}",
                failure.message()
            );
        })
        .build()
        .expect("valid pool configuration");

    for i in 0..10u32 {
        pool.submit(move || {
            if i % 3 == 0 {
                panic!("job {i} hit a bad input");
            }
            println!("job {i} ok");
        })
        .unwrap();
    }

    let divided = pool.spawn(|| 10u32.checked_div(0).expect("division by zero")).unwrap();
    println!("spawned result: {:?}", divided.join());

    pool.shutdown_graceful().unwrap();
    log_metrics!(metrics);
}
