use boundpool::{create_thread_pool, submit_task};
use std::time::Duration;

fn main() {
    let pool = create_thread_pool!(num_threads: 4, queue_capacity: 8).unwrap();
    submit_task!(pool, || println!("Task without a deadline")).unwrap();
    submit_task!(pool, || println!("Task with a deadline"), timeout: Duration::from_secs(1)).unwrap();
    pool.shutdown_graceful().unwrap();
}
