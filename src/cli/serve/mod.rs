//! Development server with live reload support.
//!
//! ```text
//! GET /zapp/client  → embedded client script
//! GET <path>        → path::resolve → compiler::render → content::maybe_inject
//! ```

mod content;
mod lifecycle;
pub mod path;
mod response;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Method, Request, Server};

use crate::compiler;
use crate::config::{DEFAULT_WS_PORT, ServeConfig};
use crate::embed::serve::{CLIENT_JS, CLIENT_PATH, ClientVars};
use crate::utils::mime::types;
use crate::{debug, log};
use path::ResolvedTarget;
use response::Reply;

/// Number of request worker threads.
const REQUEST_THREADS: usize = 4;

/// Actual WebSocket port (may differ from the configured one if it was in use)
/// Updated by the coordinator after the WebSocket server binds
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(DEFAULT_WS_PORT);

/// Update the actual WebSocket port (called by coordinator after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    config: Arc<ServeConfig>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: Arc<ServeConfig>) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    set_actual_ws_port(config.serve.ws_port);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{} ({})", addr, config.root.display());
    if !config.serve.watch {
        debug!("serve"; "watch disabled, live reload off");
    }

    Ok(BoundServer {
        server,
        addr,
        config,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the request loop (blocking).
    pub fn run(self) -> Result<()> {
        debug!("serve"; "accepting requests on {}", self.addr);
        let actor_handle = lifecycle::spawn_actors(Arc::clone(&self.config), self.shutdown_rx);
        let result = run_request_loop(&self.server, &self.config);
        lifecycle::wait_for_shutdown(actor_handle);
        result
    }
}

fn run_request_loop(server: &Server, config: &Arc<ServeConfig>) -> Result<()> {
    // A slow renderer only stalls its own worker
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ServeConfig) -> Result<()> {
    let reply = if crate::core::is_shutdown() {
        Reply::unavailable()
    } else if matches!(request.method(), Method::Get | Method::Head) {
        respond_to(request.url(), config)
    } else {
        Reply::method_not_allowed()
    };

    debug!("serve"; "{} {} -> {}", request.method(), request.url(), reply.status);
    response::send(request, reply)
}

/// Build the reply for a GET of `url`.
fn respond_to(url: &str, config: &ServeConfig) -> Reply {
    let path_only = url.split(['?', '#']).next().unwrap_or_default();
    if path_only == CLIENT_PATH {
        let js = CLIENT_JS.render(&ClientVars {
            ws_port: actual_ws_port(),
        });
        return Reply::ok(types::JAVASCRIPT, js.into_bytes());
    }

    let file = match path::resolve(url, &config.root) {
        Ok(ResolvedTarget::Found(file)) => file,
        Ok(ResolvedTarget::NotFound) => return Reply::not_found(),
        Err(e) => {
            debug!("serve"; "rejected {}: {}", url, e);
            return Reply::not_found();
        }
    };

    match compiler::render(&file, config) {
        Ok(result) => {
            let body = content::maybe_inject(result.bytes, result.content_type, config.serve.watch);
            Reply::ok(result.content_type, body)
        }
        Err(e) => {
            let shown = e.path().strip_prefix(&config.root).unwrap_or(e.path());
            let summary = format!("failed to render {}", shown.display());
            crate::logger::status_error(&summary, &format!("{:#}", anyhow::Error::new(e)));
            Reply::internal_error()
        }
    }
}
