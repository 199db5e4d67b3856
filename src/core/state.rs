//! Shutdown coordination between the Ctrl+C handler, the request loop and
//! the actor system.
//!
//! ```text
//! Ctrl+C → SHUTDOWN = true
//!        → SHUTDOWN_TX.send(())   (actors close their clients)
//!        → SERVER.unblock()       (request loop returns)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::anyhow;
use crossbeam::channel::Sender;
use tiny_http::Server;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Set once the HTTP server is bound.
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Wakes the actor system.
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Install the Ctrl+C handler. Call once, before binding anything.
///
/// Until [`register_server`] runs, Ctrl+C exits the process directly.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let Some(server) = SERVER.get() else {
            std::process::exit(0);
        };

        crate::log!("serve"; "shutting down...");
        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }
        server.unblock();
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Hand the bound server and the actor wake-up channel to the handler.
pub fn register_server(server: Arc<Server>, shutdown_tx: Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Whether Ctrl+C has been received. Polled by background loops.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
