//! Actor Message Definitions
//!
//! ```text
//! FsActor --Refresh--> WsActor
//! handshake thread --AddClient--> WsActor
//! ```

use std::net::TcpStream;

use tungstenite::WebSocket;

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// A debounce window closed with file changes; tell every client
    Refresh {
        /// Number of distinct files in the window
        changed: usize,
    },
    /// Client whose handshake already completed
    AddClient(WebSocket<TcpStream>),
    /// Close all clients and stop
    Shutdown,
}
