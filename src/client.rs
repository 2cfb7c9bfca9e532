use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::Error;

/// A client for the line protocol. Sends one command per line and reads exactly one reply line
/// back, with the trailing newline removed.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Client, Error> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();

        Ok(Client {
            reader: BufReader::new(reader),
            writer,
        })
    }

    pub async fn set(&mut self, key: &str, value: &str) -> Result<String, Error> {
        self.send(&format!("SET {} {}", key, value)).await
    }

    pub async fn get(&mut self, key: &str) -> Result<String, Error> {
        self.send(&format!("GET {}", key)).await
    }

    pub async fn del(&mut self, key: &str) -> Result<String, Error> {
        self.send(&format!("DEL {}", key)).await
    }

    pub async fn get_all(&mut self) -> Result<String, Error> {
        self.send("GETALL").await
    }

    /// Sends a raw command line and waits for its reply.
    pub async fn send(&mut self, command: &str) -> Result<String, Error> {
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.read_reply().await
    }

    /// Reads one reply line. Fails if the server closed the connection.
    pub async fn read_reply(&mut self) -> Result<String, Error> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err("connection closed by server".into());
        }

        let reply = line.strip_suffix('\n').unwrap_or(&line);
        Ok(reply.to_string())
    }

    /// Writes raw bytes without waiting for a reply.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer.write_all(bytes).await?;
        Ok(())
    }
}
