//! Server configuration.
//!
//! Values are merged in order: defaults, then `ROOT/zapp.toml`, then CLI flags.
//!
//! ```text
//! config/
//! ├── error.rs    # ConfigError
//! ├── ignore.rs   # IgnoreSet (.zappignore + [serve] ignore)
//! ├── serve.rs    # [serve] section
//! └── mod.rs      # ServeConfig (this file)
//! ```

mod error;
mod ignore;
mod serve;

pub use error::ConfigError;
pub use ignore::{IGNORE_FILE, IgnoreSet};
pub use serve::{DEFAULT_WS_PORT, ServeSection};

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Optional project-local config file name.
pub const CONFIG_FILE: &str = "zapp.toml";

/// Contents of `zapp.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Development server settings
    pub serve: ServeSection,
}

impl ConfigFile {
    /// Parse with unknown field detection.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Load `zapp.toml` from `root`, or defaults when it does not exist.
    fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(path, e)),
        };

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        for field in &ignored {
            log!("warning"; "unknown field in {}: {}", CONFIG_FILE, field);
        }
        Ok(config)
    }
}

/// Resolved configuration for one server process. Immutable after load.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Absolute, canonical served root.
    pub root: PathBuf,
    /// `[serve]` values after CLI overrides.
    pub serve: ServeSection,
    /// Watcher ignore patterns.
    pub ignore: IgnoreSet,
}

impl ServeConfig {
    /// Load configuration for the root named on the command line.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to get current working directory")?,
        };
        let root = root
            .canonicalize()
            .map_err(|e| ConfigError::Io(root.clone(), e))?;
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root).into());
        }

        let file = ConfigFile::load(&root)
            .with_context(|| format!("failed to load {}", root.join(CONFIG_FILE).display()))?;

        let mut serve = file.serve;
        apply_cli(&mut serve, cli);

        let ignore = IgnoreSet::load(&root, &serve.ignore)?;

        Ok(Self {
            root,
            serve,
            ignore,
        })
    }

    /// Configuration for `root` with default settings.
    pub fn for_root(root: &Path) -> Result<Self, ConfigError> {
        let serve = ServeSection::default();
        let ignore = IgnoreSet::new(root, &serve.ignore)?;
        Ok(Self {
            root: root.to_path_buf(),
            serve,
            ignore,
        })
    }

    /// Whether scripts and stylesheets are minified.
    pub fn ugly(&self) -> bool {
        self.serve.ugly
    }
}

/// Apply command-line overrides on top of file values.
fn apply_cli(serve: &mut ServeSection, cli: &Cli) {
    if let Some(interface) = cli.interface {
        serve.interface = interface;
    }
    if let Some(port) = cli.port {
        serve.port = port;
    }
    if let Some(ws_port) = cli.ws_port {
        serve.ws_port = ws_port;
    }
    if let Some(ugly) = cli.ugly {
        serve.ugly = ugly;
    }
    if cli.no_watch {
        serve.watch = false;
    }
}

/// Parse a `zapp.toml` snippet, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ConfigFile {
    let (parsed, ignored) = ConfigFile::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
