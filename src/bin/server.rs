use clap::Parser;
use std::net::IpAddr;
use tracing::{debug, error, info};

use linekv::codec::DEFAULT_MAX_LINE_LENGTH;
use linekv::config::{DEFAULT_BACKLOG, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT};
use linekv::server::shutdown_signal;
use linekv::table::DEFAULT_BUCKETS;
use linekv::{Config, Error, Server};

#[derive(Parser, Debug)]
#[command(version, about = "In-memory key-value server speaking a line protocol")]
struct Args {
    /// The address to listen on
    #[arg(long, env = "LINEKV_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// The port to listen on
    #[arg(short, long, env = "LINEKV_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Length of the pending connections queue
    #[arg(long, env = "LINEKV_BACKLOG", default_value_t = DEFAULT_BACKLOG)]
    backlog: u32,

    /// Connections served at once; further connections are closed on accept
    #[arg(short, long, env = "LINEKV_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Number of hash buckets in the store
    #[arg(long, env = "LINEKV_BUCKETS", default_value_t = DEFAULT_BUCKETS)]
    buckets: usize,

    /// Longest accepted request line, in bytes
    #[arg(long, env = "LINEKV_MAX_LINE_LENGTH", default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_thread_names(true)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let args = Args::parse();

    let config = Config::builder()
        .host(args.host)
        .port(args.port)
        .backlog(args.backlog)
        .max_connections(args.max_connections)
        .buckets(args.buckets)
        .max_line_length(args.max_line_length)
        .build();

    let server = match Server::bind(config.clone()) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to listen on {}: {}", config.addr(), e);
            std::process::exit(1);
        }
    };

    let summary = server.run_until(shutdown_signal()).await?;

    info!("Server stopped");
    println!("\n{}", summary);

    Ok(())
}
