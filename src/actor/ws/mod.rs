//! WebSocket Actor
//!
//! Owns the [`ConnectionRegistry`] and turns actor messages into registry
//! operations:
//!
//! ```text
//! handshake thread --AddClient--> WsActor --register--> registry
//! FsActor  --Refresh----> WsActor --broadcast--> registry --"refresh"--> clients
//! reader thread --closed()--> unregister
//! ```

mod client_io;
pub mod registry;
pub mod server;

use std::net::TcpStream;
use std::sync::Arc;

use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use registry::ConnectionRegistry;

/// The only frame the server ever sends.
pub const REFRESH: &str = "refresh";

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    registry: Arc<ConnectionRegistry<WebSocket<TcpStream>>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let registry = Arc::clone(&self.registry);
        std::thread::spawn(move || client_io::disconnect_loop(registry));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Refresh { changed } => {
                    crate::debug!("ws"; "refresh after {} change(s)", changed);
                    let delivered = self.registry.broadcast(REFRESH);
                    crate::logger::status_success(&format!(
                        "refreshed {} client(s)",
                        delivered
                    ));
                }
                WsMsg::AddClient(ws) => {
                    self.registry.register(ws);
                }
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "closing {} client(s)", self.registry.len());
                    self.registry.close_all();
                    break;
                }
            }
        }
    }
}
