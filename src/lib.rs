pub mod client;
pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod reply;
pub mod server;
pub mod stats;
pub mod store;
pub mod table;

pub use config::Config;
pub use server::Server;
pub use store::Store;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
