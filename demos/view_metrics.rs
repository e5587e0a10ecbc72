use boundpool::{
    metrics::{AtomicMetricsCollector, ThreadPoolMetrics},
    ThreadPoolBuilder,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

fn main() {
    // Create metrics and collector
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));

    // Create a thread pool with the metrics collector
    let pool = ThreadPoolBuilder::new()
        .num_threads(4)
        .queue_capacity(4)
        .with_metrics_collector(collector)
        .build()
        .expect("valid pool configuration");

    // Create a flag to stop monitoring
    let running = Arc::new(AtomicBool::new(true));

    // Spawn a monitoring thread to display live updates
    let metrics_clone = metrics.clone();
    let running_clone = running.clone();
    let monitor_handle = thread::spawn(move || {
        while running_clone.load(Ordering::Acquire) {
            println!("\n--- Metrics ---");
            println!("Queued tasks: {}", metrics_clone.queued_tasks.load(Ordering::SeqCst));
            println!("Running tasks: {}", metrics_clone.running_tasks.load(Ordering::SeqCst));
            println!("Completed tasks: {}", metrics_clone.completed_tasks.load(Ordering::SeqCst));
            println!("Active threads: {}", metrics_clone.active_threads.load(Ordering::SeqCst));

            thread::sleep(Duration::from_millis(80));
        }
    });

    // Twice as many tasks as queue slots plus workers: the last ones wait in submit
    for _ in 0..16 {
        pool.submit(|| {
            thread::sleep(Duration::from_millis(100)); // Simulate work
        })
        .unwrap();
    }

    // Hard stop: whatever is still queued now is dropped
    thread::sleep(Duration::from_millis(150));
    pool.shutdown_now().unwrap();

    // Stop the monitoring thread
    running.store(false, Ordering::Release);
    monitor_handle.join().unwrap();

    // Final metrics after shutdown
    println!("\n--- Final Metrics ---");
    println!("Completed tasks: {}", metrics.completed_tasks.load(Ordering::SeqCst));
    println!("Discarded tasks: {}", metrics.discarded_tasks.load(Ordering::SeqCst));
    println!("Active threads: {}", metrics.active_threads.load(Ordering::SeqCst));
}
