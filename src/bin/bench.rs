use clap::Parser;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use linekv::client::Client;
use linekv::config::DEFAULT_PORT;
use linekv::Error;

/// Load generator: every request sets a key, reads it back and deletes it half of the time.
#[derive(Parser, Debug)]
#[command(version, about = "Load test for a linekv server")]
struct Args {
    /// Server address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of TCP connections in the pool
    #[arg(long, default_value_t = 4)]
    pool_size: usize,

    /// Number of requests to send
    #[arg(short, long, default_value_t = 100_000)]
    num_requests: usize,
}

/// Connections are handed out round-robin; a connection serves one command at a time.
struct Pool {
    connections: Vec<Mutex<Client>>,
    next: AtomicUsize,
}

impl Pool {
    async fn connect(addr: &str, size: usize) -> Result<Pool, Error> {
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size.max(1) {
            let client = Client::connect(addr)
                .await
                .map_err(|e| format!("failed to create initial connection: {}", e))?;
            connections.push(Mutex::new(client));
        }

        Ok(Pool {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    async fn send(&self, command: String, stats: &OperationStats) -> Option<String> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let mut client = self.connections[index].lock().await;

        let start = Instant::now();
        match client.send(&command).await {
            Ok(reply) => {
                stats.add_success(start.elapsed());
                Some(reply)
            }
            Err(_) => {
                stats.add_failure();
                None
            }
        }
    }
}

#[derive(Default)]
struct OperationStats {
    inner: StdMutex<Samples>,
}

#[derive(Default)]
struct Samples {
    times: Vec<Duration>,
    failures: usize,
    total: usize,
}

impl OperationStats {
    fn add_success(&self, duration: Duration) {
        let mut samples = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        samples.times.push(duration);
        samples.total += 1;
    }

    fn add_failure(&self) {
        let mut samples = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        samples.failures += 1;
        samples.total += 1;
    }

    fn totals(&self) -> (usize, usize) {
        let samples = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (samples.total, samples.failures)
    }

    fn print(&self, operation: &str) {
        let samples = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let min = samples.times.iter().min().copied().unwrap_or_default();
        let max = samples.times.iter().max().copied().unwrap_or_default();
        let avg = match samples.times.len() {
            0 => Duration::ZERO,
            n => samples.times.iter().sum::<Duration>() / n as u32,
        };

        println!(
            "{} -> Min: {:?} | Max: {:?} | Avg: {:?} | Failures: {}",
            operation, min, max, avg, samples.failures
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    println!("\nStarting load test...");
    println!("Target server: {}", addr);
    println!(
        "Pool size: {} | Total requests: {}",
        args.pool_size, args.num_requests
    );
    println!("------------------------------------------------");

    let pool = Arc::new(Pool::connect(&addr, args.pool_size).await?);
    let set_stats = Arc::new(OperationStats::default());
    let get_stats = Arc::new(OperationStats::default());
    let del_stats = Arc::new(OperationStats::default());
    let get_all_stats = OperationStats::default();

    let start = Instant::now();
    let mut requests = JoinSet::new();

    for i in 0..args.num_requests {
        let pool = Arc::clone(&pool);
        let set_stats = Arc::clone(&set_stats);
        let get_stats = Arc::clone(&get_stats);
        let del_stats = Arc::clone(&del_stats);

        requests.spawn(async move {
            pool.send(format!("SET key{} value{}", i, i), &set_stats)
                .await;
            pool.send(format!("GET key{}", i), &get_stats).await;
            if rand::random::<bool>() {
                pool.send(format!("DEL key{}", i), &del_stats).await;
            }
        });
    }

    while requests.join_next().await.is_some() {}

    pool.send("GETALL".to_string(), &get_all_stats).await;

    let elapsed = start.elapsed();

    println!("\n----- Benchmark Results -----");
    println!("Total TCP Connections: {}", args.pool_size);
    println!("Total Requests Made: {}", args.num_requests);
    println!("Total Duration: {:?}", elapsed);
    println!();

    set_stats.print("SET");
    get_stats.print("GET");
    del_stats.print("DEL");
    get_all_stats.print("GETALL");

    let (total, failures) = [&*set_stats, &*get_stats, &*del_stats, &get_all_stats]
        .iter()
        .map(|stats| stats.totals())
        .fold((0, 0), |(total, failures), (t, f)| (total + t, failures + f));

    let qps = total as f64 / elapsed.as_secs_f64();
    let success_rate = match total {
        0 => 0.0,
        total => (total - failures) as f64 / total as f64 * 100.0,
    };

    println!("\n----- Cumulative Metrics -----");
    println!("Total Queries Processed: {}", total);
    println!("Total Failures: {}", failures);
    println!("Overall QPS: {:.2}", qps);
    println!("Success Rate: {:.2}%", success_rate);
    println!("-----------------------------");

    Ok(())
}
