use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::{CodecError, LineCodec};
use crate::reply::Reply;

/// State of one client connection: its identity and the framed stream.
///
/// Data is read from the socket into the codec's read buffer. When a complete line is found, the
/// corresponding bytes are removed from the buffer; whatever remains waits for the next read.
pub struct Connection {
    pub id: Uuid,
    pub client_address: SocketAddr,
    framed: Framed<TcpStream, LineCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr, codec: LineCodec) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            client_address,
            framed: Framed::new(stream, codec),
        }
    }

    /// Reads the next request line. Returns `None` once the peer has closed the connection and
    /// every buffered line has been consumed.
    pub async fn read_line(&mut self) -> Result<Option<String>, CodecError> {
        self.framed.next().await.transpose()
    }

    /// Writes a reply and flushes it, so the client sees it before the next line is read.
    pub async fn write_reply(&mut self, reply: Reply) -> Result<(), CodecError> {
        self.framed.send(reply).await
    }
}
