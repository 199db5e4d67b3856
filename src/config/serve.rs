//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port number
//! ws_port = 35729             # Live reload WebSocket port
//! ugly = false                # Minify scripts and stylesheets
//! watch = true                # Live reload on file changes
//! ignore = ["dist", "*.log"]  # Extra ignore patterns for the watcher
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Default WebSocket port for live reload
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeSection {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port for live reload (retried upward when busy).
    pub ws_port: u16,

    /// Minify rendered scripts and stylesheets.
    pub ugly: bool,

    /// Watch the served root and refresh clients on change.
    pub watch: bool,

    /// Extra watcher ignore patterns, merged with `.zappignore`.
    pub ignore: Vec<String>,
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            ws_port: DEFAULT_WS_PORT,
            ugly: false,
            watch: true,
            ignore: Vec::new(),
        }
    }
}
