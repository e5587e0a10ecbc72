use boundpool::{run_thread_per_task, BoxedTask, ConfigError, PoolState, ThreadPool, ThreadPoolBuilder};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

#[test]
fn test_basic_pool() {
    let pool = ThreadPool::new(2, 4, |_| {}).unwrap();
    let handle = pool.spawn(|| 42).unwrap();
    assert_eq!(handle.join().unwrap(), 42);
    pool.shutdown_graceful().unwrap();
    assert_eq!(pool.state(), PoolState::Stopped);
}

#[test]
fn test_builder_settings() {
    let pool = ThreadPoolBuilder::new()
        .num_threads(3)
        .queue_capacity(7)
        .thread_name("integration")
        .build()
        .unwrap();
    assert_eq!(pool.num_threads(), 3);
    assert_eq!(pool.queue_capacity(), 7);
    assert_eq!(pool.config().thread_name, "integration");

    let name = pool
        .spawn(|| std::thread::current().name().map(str::to_owned))
        .unwrap()
        .join()
        .unwrap()
        .unwrap();
    assert!(name.starts_with("integration-"), "unexpected thread name {name}");
    pool.shutdown_graceful().unwrap();
}

#[test]
fn test_invalid_configuration() {
    assert!(matches!(
        ThreadPool::new(0, 4, |_| {}),
        Err(ConfigError::ZeroWorkers)
    ));
    assert!(matches!(
        ThreadPool::new(4, 0, |_| {}),
        Err(ConfigError::ZeroCapacity)
    ));
}

#[test]
fn test_example_scenario() {
    // Two workers, three slots, five slow tasks: submission has to block.
    let log = Arc::new(Mutex::new(Vec::new()));
    let pool = ThreadPool::new(2, 3, |_| {}).unwrap();

    for i in 0..5 {
        let log = Arc::clone(&log);
        pool.submit(move || {
            std::thread::sleep(Duration::from_millis(50));
            log.lock().unwrap().push(i);
        })
        .unwrap();
    }
    pool.shutdown_graceful().unwrap();

    let mut seen = log.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_capacity_never_exceeded() {
    let capacity = 4;
    let pool = Arc::new(ThreadPool::new(2, capacity, |_| {}).unwrap());
    let max_seen = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let max_seen = Arc::clone(&max_seen);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    pool.submit(|| std::thread::sleep(Duration::from_micros(200)))
                        .unwrap();
                    max_seen.fetch_max(pool.queued(), Ordering::SeqCst);
                }
            })
        })
        .collect();

    for s in submitters {
        s.join().unwrap();
    }
    pool.shutdown_graceful().unwrap();

    assert!(max_seen.load(Ordering::SeqCst) <= capacity);
    assert_eq!(pool.queued(), 0);
}

#[test]
fn test_map_preserves_input_order() {
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let words = vec!["a", "bb", "ccc", "dddd"];
    let lengths: Vec<usize> = pool
        .map(words, |w| w.len())
        .unwrap()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();
    assert_eq!(lengths, vec![1, 2, 3, 4]);
    pool.shutdown_graceful().unwrap();
}

#[test]
fn test_thread_per_task_survives_a_panicking_task() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut tasks: Vec<BoxedTask> = (0..3)
        .map(|_| {
            let counter = Arc::clone(&counter);
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }) as BoxedTask
        })
        .collect();
    tasks.insert(1, Box::new(|| panic!("baseline task failed")));

    run_thread_per_task(tasks);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}
