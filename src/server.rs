use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::codec::{CodecError, LineCodec};
use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::config::Config;
use crate::connection::Connection;
use crate::reply::Reply;
use crate::stats::{ActiveConnection, Stats, Summary};
use crate::store::Store;
use crate::Error;

/// The listening side of the server: owns the listening socket, the store and the counters.
pub struct Server {
    listener: TcpListener,
    store: Store,
    stats: Arc<Stats>,
    config: Config,
}

impl Server {
    /// Binds the listening socket. Failing here is fatal: without it no traffic can be served.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: Config) -> Result<Server, Error> {
        let addr = config.addr();
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;

        Ok(Server {
            listener,
            store: Store::new(config.buckets),
            stats: Arc::new(Stats::new()),
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// Serves connections until `shutdown` resolves.
    ///
    /// On shutdown the server stops accepting, closes every open connection without a final
    /// reply, releases the listening socket and returns the lifetime counters.
    pub async fn run_until<F>(self, shutdown: F) -> Result<Summary, Error>
    where
        F: Future<Output = ()> + Send,
    {
        let Server {
            listener,
            store,
            stats,
            config,
        } = self;
        let cancel_token = CancellationToken::new();
        tokio::pin!(shutdown);

        info!(
            "Server listening on {} (max_connections: {}, buckets: {})",
            listener.local_addr()?,
            config.max_connections,
            config.buckets
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Server shutting down");
                    break;
                }
                result = listener.accept() => {
                    let (stream, client_address) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            // Failing to accept one connection does not affect the others.
                            error!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };

                    let Some(active) = stats.try_admit(config.max_connections) else {
                        error!(
                            "Max clients reached ({}). Rejecting connection from {}",
                            config.max_connections, client_address
                        );
                        drop(stream);
                        continue;
                    };

                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", client_address, e);
                    }

                    info!(
                        "Accepted connection from {} (active: {}/{})",
                        client_address,
                        stats.active_connections(),
                        config.max_connections
                    );

                    let conn = Connection::new(
                        stream,
                        client_address,
                        LineCodec::new(config.max_line_length),
                    );
                    tokio::spawn(serve(
                        conn,
                        store.clone(),
                        Arc::clone(&stats),
                        active,
                        cancel_token.child_token(),
                    ));
                }
            }
        }

        cancel_token.cancel();
        drop(listener);

        Ok(stats.summary())
    }
}

/// Resolves when the process is asked to stop.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

async fn serve(
    conn: Connection,
    store: Store,
    stats: Arc<Stats>,
    active: ActiveConnection,
    cancel_token: CancellationToken,
) {
    // Dropping the guard when the connection ends releases its slot.
    let _active = active;

    tokio::select! {
        result = handle_connection(conn, store, &stats) => {
            if let Err(e) = result {
                warn!("Connection closed with error: {}", e);
            }
        }
        _ = cancel_token.cancelled() => {
            debug!("Connection dropped on shutdown");
        }
    }
}

#[instrument(
    name = "connection",
    skip(conn, store, stats),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    mut conn: Connection,
    store: Store,
    stats: &Stats,
) -> Result<(), CodecError> {
    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", conn.client_address.to_string());

    while let Some(line) = conn.read_line().await? {
        debug!("Received line from client: {:?}", line);
        let cmd = Command::from(line.as_str());
        let reply = cmd.exec(&store).unwrap_or_else(|err| {
            debug!("Command failed: {}", err);
            Reply::from(err)
        });
        stats.record_command();

        debug!("Sending response to client: {}", reply);
        conn.write_reply(reply).await?;
    }

    info!("Connection closed");
    Ok(())
}
