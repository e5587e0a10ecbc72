//! Two workers, three queue slots and five slow jobs: watch `submit` block until a
//! worker frees a slot, then drain everything on shutdown.

use boundpool::{PoolError, ThreadPool};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    let pool = ThreadPool::new(2, 3, |failure| {
        eprintln!("job failed: {failure}");
    })
    .expect("valid pool configuration");

    let log = Arc::new(Mutex::new(Vec::new()));
    let start = Instant::now();

    for id in 0..5 {
        let log = Arc::clone(&log);
        let queued_at = Instant::now();
        pool.submit(move || {
            info!(job = id, "job starting");
            thread::sleep(Duration::from_millis(500 + (id % 3) * 250));
            log.lock().unwrap().push(id);
            info!(job = id, "job completed");
        })
        .expect("pool is running");
        info!(
            job = id,
            waited_ms = queued_at.elapsed().as_millis() as u64,
            queued = pool.queued(),
            "job submitted"
        );
    }

    // The queue is full again; a bounded wait gives up instead of blocking forever.
    for id in 5..8 {
        let late = move || info!(job = id, "late job ran");
        match pool.submit_timeout(late, Duration::from_millis(50)) {
            Ok(()) => info!(job = id, "late job accepted"),
            Err(PoolError::Timeout(waited)) => info!(job = id, ?waited, "late job timed out"),
            Err(err) => info!(job = id, %err, "late job rejected"),
        }
    }

    pool.shutdown_graceful().unwrap();
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        completed = ?log.lock().unwrap(),
        "all jobs drained"
    );

    match pool.submit(|| {}) {
        Err(PoolError::PoolClosed) => info!("submission after shutdown was rejected"),
        other => info!(?other, "unexpected submission outcome"),
    }
}
