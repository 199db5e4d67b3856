use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::registry::{ClientSocket, ConnectionRegistry};

/// How often the reader thread polls sockets for a disconnect.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn is_would_block(err: &tungstenite::Error) -> bool {
    matches!(err, tungstenite::Error::Io(e) if e.kind() == ErrorKind::WouldBlock)
}

impl ClientSocket for WebSocket<TcpStream> {
    fn is_open(&self) -> bool {
        self.can_write()
    }

    fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
        // Non-blocking socket: a full buffer still queues the frame.
        match self.send(Message::text(text.to_owned())) {
            Ok(()) => Ok(()),
            Err(e) if is_would_block(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn poll_closed(&mut self) -> bool {
        // Drain whatever the client sent; only the close matters.
        loop {
            match self.read() {
                Ok(Message::Close(_)) => return true,
                Ok(_) => continue,
                Err(e) if is_would_block(&e) => return false,
                Err(_) => return true,
            }
        }
    }

    fn close(&mut self) {
        let _ = WebSocket::close(self, None);
        let _ = self.flush();
    }
}

/// Upper bound on how long a peer may take to send its upgrade request.
pub(super) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// Complete the handshake on a freshly accepted stream.
///
/// Blocking with a read timeout during the handshake, non-blocking
/// afterwards for polling reads.
pub(super) fn handshake(stream: TcpStream) -> anyhow::Result<WebSocket<TcpStream>> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;

    let ws = tungstenite::accept(stream).map_err(|e| anyhow::anyhow!("{e}"))?;

    let stream = ws.get_ref();
    stream.set_read_timeout(None)?;
    stream.set_nonblocking(true)?;
    Ok(ws)
}

/// Background loop unregistering clients whose transport went away.
pub(super) fn disconnect_loop(registry: Arc<ConnectionRegistry<WebSocket<TcpStream>>>) {
    while !crate::core::is_shutdown() {
        std::thread::sleep(POLL_INTERVAL);
        if registry.is_empty() {
            continue;
        }

        for id in registry.closed() {
            registry.unregister(&id);
        }
    }
}
