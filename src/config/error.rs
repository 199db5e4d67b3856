//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("`{0}` is not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid ignore pattern `{0}`")]
    Pattern(String, #[source] globset::Error),
}
