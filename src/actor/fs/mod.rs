//! FileSystem Actor
//!
//! Watches the served root and tells the [`WsActor`](super::ws::WsActor) to
//! refresh clients once a burst of changes has settled.
//!
//! ```text
//! notify → ChangeEvent → filter (ignore set, temp files) → Debouncer → WsMsg::Refresh
//! ```

// Pure timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;


use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::config::ServeConfig;
use debouncer::Debouncer;
use types::{ChangeEvent, ChangeKind, is_temp_file};

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    ws_tx: mpsc::Sender<WsMsg>,
    config: Arc<ServeConfig>,
}

impl FsActor {
    /// Start watching the served root. Events buffer until [`run`](Self::run).
    pub fn new(ws_tx: mpsc::Sender<WsMsg>, config: Arc<ServeConfig>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(&config.root, RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", config.root.display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            ws_tx,
            config,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let mut debouncer = Debouncer::new();

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify is sync; bridge it onto the runtime
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => {
                    let now = Instant::now();
                    for change in ChangeEvent::from_notify(&event) {
                        if is_relevant(&change, &self.config) {
                            debouncer.add_event(&change, now);
                        }
                    }
                }
                _ = tokio::time::sleep(debouncer.sleep_duration(Instant::now())) => {
                    let Some(changes) = debouncer.take_if_ready(Instant::now()) else {
                        continue;
                    };
                    log_changes(&changes, &self.config.root);
                    let msg = WsMsg::Refresh { changed: changes.len() };
                    if self.ws_tx.send(msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Whether a change should enter the debounce window.
fn is_relevant(change: &ChangeEvent, config: &ServeConfig) -> bool {
    if is_temp_file(&change.path) {
        return false;
    }
    if config.ignore.is_ignored(&change.path) {
        crate::debug!("watch"; "ignored: {}", change.path.display());
        return false;
    }
    true
}

fn log_changes(changes: &FxHashMap<std::path::PathBuf, ChangeKind>, root: &Path) {
    for (path, kind) in changes {
        let shown = path.strip_prefix(root).unwrap_or(path);
        crate::log!("watch"; "{}: {}", kind.label(), shown.display());
    }
}
