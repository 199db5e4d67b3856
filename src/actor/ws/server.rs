//! WebSocket listener.
//!
//! Accepts TCP connections on the reload port. Each connection completes its
//! handshake on its own thread, so a silent peer never holds up the
//! acceptor or the [`WsActor`](super::WsActor).

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use super::client_io;
use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the reload port and spawn the acceptor thread. Returns the bound port.
pub fn start(interface: IpAddr, base_port: u16, ws_tx: mpsc::Sender<WsMsg>) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || accept_loop(listener, ws_tx));

    Ok(actual_port)
}

fn accept_loop(listener: TcpListener, ws_tx: mpsc::Sender<WsMsg>) {
    while !crate::core::is_shutdown() {
        match listener.accept() {
            Ok((stream, addr)) => {
                crate::debug!("ws"; "connection from {}", addr);
                let ws_tx = ws_tx.clone();
                std::thread::spawn(move || upgrade(stream, ws_tx));
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                crate::log!("ws"; "accept error: {}", e);
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

/// Upgrade one connection and hand it to the actor.
fn upgrade(stream: TcpStream, ws_tx: mpsc::Sender<WsMsg>) {
    match client_io::handshake(stream) {
        Ok(ws) => {
            if ws_tx.blocking_send(WsMsg::AddClient(ws)).is_err() {
                crate::debug!("ws"; "actor gone, dropping client");
            }
        }
        Err(e) => crate::log!("ws"; "handshake failed: {}", e),
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                if offset > 0 {
                    crate::debug!("ws"; "port {} in use, using {}", base_port, actual_port);
                }
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind websocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_bind_retries_upward() {
        let (held, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        // `port` is taken; retrying from it must land above it.
        let (_listener, next) = try_bind_port(LOCALHOST, port, MAX_PORT_RETRIES).unwrap();
        assert!(next > port);
        drop(held);
    }

    #[test]
    fn test_silent_peer_does_not_delay_others() {
        let (tx, mut rx) = mpsc::channel(8);
        let port = start(LOCALHOST, 0, tx).unwrap();

        // Never sends an upgrade request
        let _silent = TcpStream::connect((LOCALHOST, port)).unwrap();
        std::thread::sleep(Duration::from_millis(150));

        let (_client, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();

        let deadline = std::time::Instant::now() + client_io::HANDSHAKE_TIMEOUT / 2;
        let msg = loop {
            match rx.try_recv() {
                Ok(msg) => break msg,
                Err(_) if std::time::Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => panic!("no client registered in time: {e}"),
            }
        };
        assert!(matches!(msg, WsMsg::AddClient(_)));
    }

    #[test]
    fn test_silent_peer_dropped_after_timeout() {
        use std::io::Read;

        let (tx, mut rx) = mpsc::channel(8);
        let port = start(LOCALHOST, 0, tx).unwrap();
        let mut silent = TcpStream::connect((LOCALHOST, port)).unwrap();
        silent
            .set_read_timeout(Some(client_io::HANDSHAKE_TIMEOUT * 3))
            .unwrap();

        // Server hangs up once the handshake times out
        let mut buf = [0u8; 16];
        assert_eq!(silent.read(&mut buf).unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_bind_fails_after_retries() {
        let (_held, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        assert!(try_bind_port(LOCALHOST, port, 1).is_err());
    }
}
