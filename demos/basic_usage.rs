fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let pool = boundpool::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("valid pool configuration");
    let handle = pool
        .spawn(|| {
            println!("Hello from the basic thread pool!");
            10
        })
        .expect("pool is running");
    let res = handle.join().unwrap();
    println!("Result from task: {}", res);
    pool.shutdown_graceful().unwrap();
}
