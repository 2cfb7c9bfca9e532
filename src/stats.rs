use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Lifetime counters of the server, shared by the accept loop and every connection task.
#[derive(Debug, Default)]
pub struct Stats {
    total_connections: AtomicU64,
    total_commands: AtomicU64,
    active_connections: AtomicUsize,
}

impl Stats {
    pub fn new() -> Stats {
        Self::default()
    }

    /// Admits a connection unless `max_connections` are already active.
    ///
    /// The returned guard keeps the connection counted as active until it is dropped.
    pub fn try_admit(self: &Arc<Self>, max_connections: usize) -> Option<ActiveConnection> {
        self.active_connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (active < max_connections).then_some(active + 1)
            })
            .ok()?;

        self.total_connections.fetch_add(1, Ordering::Relaxed);

        Some(ActiveConnection {
            stats: Arc::clone(self),
        })
    }

    pub fn record_command(&self) {
        self.total_commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            total_commands: self.total_commands.load(Ordering::Relaxed),
        }
    }
}

/// Marks one connection as active for as long as it lives.
#[derive(Debug)]
pub struct ActiveConnection {
    stats: Arc<Stats>,
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        self.stats.active_connections.fetch_sub(1, Ordering::AcqRel);
    }
}

/// The counters reported when the server stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total_connections: u64,
    pub total_commands: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const BORDER: &str = "+-------------------------+-------------------------+";

        writeln!(f, "{}", BORDER)?;
        writeln!(f, "| {:<23} | {:<23} |", "Total Clients Connected", "Total Queries Processed")?;
        writeln!(f, "{}", BORDER)?;
        writeln!(
            f,
            "| {:>23} | {:>23} |",
            self.total_connections, self.total_commands
        )?;
        write!(f, "{}", BORDER)
    }
}
