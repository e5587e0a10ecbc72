use boundpool::{
    metrics::{AtomicMetricsCollector, ThreadPoolMetrics},
    JoinError, PoolError, PoolState, ThreadPool, ThreadPoolBuilder,
};
use crossbeam::channel::{unbounded, Sender};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

/// Parks `n` workers on a gate and returns the sender that holds it shut.
/// Dropping the sender releases them.
fn occupy_workers(pool: &ThreadPool, n: usize) -> Sender<()> {
    let (release_tx, release_rx) = unbounded::<()>();
    let (started_tx, started_rx) = unbounded::<()>();
    for _ in 0..n {
        let release_rx = release_rx.clone();
        let started_tx = started_tx.clone();
        pool.submit(move || {
            started_tx.send(()).unwrap();
            let _ = release_rx.recv();
        })
        .unwrap();
    }
    for _ in 0..n {
        started_rx.recv().unwrap();
    }
    release_tx
}

fn wait_for_state(pool: &ThreadPool, state: PoolState) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while pool.state() != state {
        assert!(Instant::now() < deadline, "pool never reached {state:?}");
        thread::sleep(Duration::from_millis(1));
    }
}

fn counting_task(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_graceful_shutdown_runs_every_task() {
    let executed = Arc::new(AtomicUsize::new(0));
    let pool = ThreadPool::new(2, 3, |_| {}).unwrap();

    for _ in 0..20 {
        let task = counting_task(&executed);
        pool.submit(move || {
            thread::sleep(Duration::from_millis(2));
            task();
        })
        .unwrap();
    }
    pool.shutdown_graceful().unwrap();

    assert_eq!(executed.load(Ordering::SeqCst), 20);
    assert_eq!(pool.state(), PoolState::Stopped);
    assert!(pool.await_termination(Duration::ZERO));
}

#[test]
fn test_hard_shutdown_discards_queued_tasks() {
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let executed = Arc::new(AtomicUsize::new(0));
    let pool = Arc::new(
        ThreadPoolBuilder::new()
            .num_threads(1)
            .queue_capacity(8)
            .with_metrics_collector(Arc::new(AtomicMetricsCollector::new(metrics.clone())))
            .build()
            .unwrap(),
    );

    let gate = occupy_workers(&pool, 1);
    for _ in 0..4 {
        pool.submit(counting_task(&executed)).unwrap();
    }
    let handle = pool.spawn(|| "unreachable").unwrap();
    assert_eq!(pool.queued(), 5);

    let releaser = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            wait_for_state(&pool, PoolState::Stopped);
            drop(gate);
        })
    };
    pool.shutdown_now().unwrap();
    releaser.join().unwrap();

    assert_eq!(executed.load(Ordering::SeqCst), 0);
    assert_eq!(handle.join(), Err(JoinError::Discarded));
    assert_eq!(metrics.discarded_tasks.load(Ordering::SeqCst), 5);
    assert_eq!(metrics.completed_tasks.load(Ordering::SeqCst), 1);
    // executed + discarded accounts for every accepted task
    assert_eq!(metrics.finished_tasks(), 6);
    assert_eq!(metrics.queued_tasks.load(Ordering::SeqCst), 0);
}

#[test]
fn test_submit_after_shutdown_is_rejected() {
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let pool = ThreadPoolBuilder::new()
        .num_threads(2)
        .with_metrics_collector(Arc::new(AtomicMetricsCollector::new(metrics.clone())))
        .build()
        .unwrap();
    pool.shutdown_graceful().unwrap();

    assert_eq!(pool.submit(|| {}), Err(PoolError::PoolClosed));
    assert_eq!(pool.try_submit(|| {}), Err(PoolError::PoolClosed));
    assert_eq!(
        pool.submit_timeout(|| {}, Duration::from_millis(10)),
        Err(PoolError::PoolClosed)
    );
    assert_eq!(pool.spawn(|| 1).err(), Some(PoolError::PoolClosed));

    assert_eq!(pool.queued(), 0);
    assert_eq!(metrics.rejected_tasks.load(Ordering::SeqCst), 4);
    assert_eq!(metrics.queued_tasks.load(Ordering::SeqCst), 0);
}

#[test]
fn test_second_shutdown_reports_already_stopped() {
    let pool = ThreadPool::new(2, 2, |_| {}).unwrap();
    pool.shutdown_graceful().unwrap();
    assert_eq!(pool.shutdown_graceful(), Err(PoolError::AlreadyStopped));
    assert_eq!(pool.shutdown_now(), Err(PoolError::AlreadyStopped));
}

#[test]
fn test_concurrent_shutdowns_both_wait_for_workers() {
    let executed = Arc::new(AtomicUsize::new(0));
    let pool = Arc::new(ThreadPool::new(2, 4, |_| {}).unwrap());
    for _ in 0..8 {
        let task = counting_task(&executed);
        pool.submit(move || {
            thread::sleep(Duration::from_millis(20));
            task();
        })
        .unwrap();
    }

    let callers: Vec<_> = (0..2)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let executed = Arc::clone(&executed);
            thread::spawn(move || {
                let res = pool.shutdown_graceful();
                (
                    res,
                    executed.load(Ordering::SeqCst),
                    pool.await_termination(Duration::ZERO),
                )
            })
        })
        .collect();

    let outcomes: Vec<_> = callers.into_iter().map(|c| c.join().unwrap()).collect();
    assert!(outcomes.iter().any(|(res, _, _)| res.is_ok()));
    for (res, seen, terminated) in outcomes {
        assert!(matches!(res, Ok(()) | Err(PoolError::AlreadyStopped)));
        assert_eq!(seen, 8);
        assert!(terminated);
    }
}

#[test]
fn test_blocked_submitter_gets_pool_closed() {
    let executed = Arc::new(AtomicUsize::new(0));
    let pool = Arc::new(ThreadPool::new(1, 1, |_| {}).unwrap());
    let gate = occupy_workers(&pool, 1);
    pool.submit(counting_task(&executed)).unwrap();

    let submitter = {
        let pool = Arc::clone(&pool);
        let task = counting_task(&executed);
        thread::spawn(move || pool.submit(task))
    };
    thread::sleep(Duration::from_millis(50));
    assert!(!submitter.is_finished(), "submit should block on a full queue");

    let stopper = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.shutdown_graceful())
    };
    assert_eq!(submitter.join().unwrap(), Err(PoolError::PoolClosed));

    drop(gate);
    assert_eq!(stopper.join().unwrap(), Ok(()));
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_submit_timeout_expires_while_full() {
    let pool = ThreadPool::new(1, 1, |_| {}).unwrap();
    let gate = occupy_workers(&pool, 1);
    pool.submit(|| {}).unwrap();

    let started = Instant::now();
    assert_eq!(
        pool.submit_timeout(|| {}, Duration::from_millis(30)),
        Err(PoolError::Timeout(Duration::from_millis(30)))
    );
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(pool.try_submit(|| {}), Err(PoolError::QueueFull));
    assert_eq!(pool.state(), PoolState::Running);
    assert_eq!(pool.queued(), 1);

    drop(gate);
    pool.shutdown_graceful().unwrap();
}

#[test]
fn test_discard_upgrades_running_drain() {
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let executed = Arc::new(AtomicUsize::new(0));
    let pool = Arc::new(
        ThreadPoolBuilder::new()
            .num_threads(1)
            .queue_capacity(4)
            .with_metrics_collector(Arc::new(AtomicMetricsCollector::new(metrics.clone())))
            .build()
            .unwrap(),
    );
    let gate = occupy_workers(&pool, 1);
    for _ in 0..3 {
        pool.submit(counting_task(&executed)).unwrap();
    }

    let drainer = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.shutdown_graceful())
    };
    wait_for_state(&pool, PoolState::Draining);

    let releaser = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            wait_for_state(&pool, PoolState::Stopped);
            drop(gate);
        })
    };
    assert_eq!(pool.shutdown_now(), Ok(()));
    assert_eq!(drainer.join().unwrap(), Ok(()));
    releaser.join().unwrap();

    assert_eq!(executed.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.discarded_tasks.load(Ordering::SeqCst), 3);
}

#[test]
fn test_shutdown_from_inside_a_task() {
    let pool = Arc::new(ThreadPool::new(2, 4, |_| {}).unwrap());
    let (tx, rx) = unbounded();

    let inner = Arc::clone(&pool);
    pool.submit(move || {
        tx.send(inner.shutdown_graceful()).unwrap();
    })
    .unwrap();

    assert_eq!(rx.recv().unwrap(), Ok(()));
    assert_eq!(pool.submit(|| {}), Err(PoolError::PoolClosed));

    let res = pool.shutdown_graceful();
    assert!(matches!(res, Ok(()) | Err(PoolError::AlreadyStopped)));
    assert_eq!(pool.state(), PoolState::Stopped);
    assert!(pool.await_termination(Duration::ZERO));
}

#[test]
fn test_drop_drains_pending_tasks() {
    let executed = Arc::new(AtomicUsize::new(0));
    let pool = ThreadPool::new(2, 4, |_| {}).unwrap();
    for _ in 0..12 {
        pool.submit(counting_task(&executed)).unwrap();
    }
    drop(pool);
    assert_eq!(executed.load(Ordering::SeqCst), 12);
}

#[test]
fn test_await_termination_times_out_while_running() {
    let pool = ThreadPool::new(1, 1, |_| {}).unwrap();
    assert!(!pool.await_termination(Duration::from_millis(10)));
    pool.shutdown_graceful().unwrap();
    assert!(pool.await_termination(Duration::ZERO));
}
