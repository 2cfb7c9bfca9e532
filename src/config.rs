//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::codec::DEFAULT_MAX_LINE_LENGTH;
use crate::table::DEFAULT_BUCKETS;

pub const DEFAULT_PORT: u16 = 2318;
pub const DEFAULT_BACKLOG: u32 = 100;
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the listening socket binds to.
    pub host: IpAddr,

    /// Port the listening socket binds to. `0` picks an ephemeral port.
    pub port: u16,

    /// Length of the queue of pending connections.
    pub backlog: u32,

    /// Connections served at once. Extra connections are accepted and closed right away.
    pub max_connections: usize,

    /// Number of hash buckets in the store. Fixed for the lifetime of the process.
    pub buckets: usize,

    /// Longest request line, in bytes. A longer line closes the connection.
    pub max_line_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            buckets: DEFAULT_BUCKETS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn backlog(mut self, backlog: u32) -> Self {
        self.config.backlog = backlog;
        self
    }

    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    pub fn buckets(mut self, buckets: usize) -> Self {
        self.config.buckets = buckets;
        self
    }

    pub fn max_line_length(mut self, length: usize) -> Self {
        self.config.max_line_length = length;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.port, 2318);
        assert_eq!(config.backlog, 100);
        assert_eq!(config.max_connections, 10_000);
        assert_eq!(config.buckets, 1024);
        assert_eq!(config.max_line_length, 1024);
        assert_eq!(config.addr(), "0.0.0.0:2318".parse().unwrap());
    }

    #[test]
    fn builder_overrides() {
        let config = Config::builder()
            .host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .port(0)
            .max_connections(2)
            .buckets(16)
            .build();

        assert_eq!(config.addr(), "127.0.0.1:0".parse().unwrap());
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.buckets, 16);
        assert_eq!(config.backlog, DEFAULT_BACKLOG);
    }
}
