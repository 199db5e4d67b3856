//! Actor Coordinator
//!
//! Creates the channel, starts the websocket listener, wires the actors and
//! runs them until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::WsMsg;
use super::ws::{WsActor, server};
use crate::config::ServeConfig;

const CHANNEL_BUFFER: usize = 32;

/// Grace period for the websocket actor to close its clients.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub struct Coordinator {
    config: Arc<ServeConfig>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<ServeConfig>) -> Self {
        Self {
            config,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(self) -> Result<()> {
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let serve = &self.config.serve;
        let ws_port = server::start(serve.interface, serve.ws_port, ws_tx.clone())
            .context("websocket server failed")?;
        crate::cli::serve::set_actual_ws_port(ws_port);
        crate::debug!("ws"; "listening on {}:{}", serve.interface, ws_port);

        let fs_actor = FsActor::new(ws_tx.clone(), Arc::clone(&self.config))
            .context("failed to start file watcher")?;
        let ws_actor = WsActor::new(ws_rx);

        crate::debug!("actor"; "start");
        run_actors(fs_actor, ws_actor, ws_tx, self.shutdown_rx).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

/// Run both actors until a shutdown signal or until one of them exits.
async fn run_actors(
    fs: FsActor,
    ws: WsActor,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let ws_handle = tokio::spawn(ws.run());
    let fs_handle = tokio::spawn(fs.run());

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        let _ = fs_handle.await;
    }

    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, ws_handle).await;
}
