//! Watcher ignore patterns.
//!
//! Patterns come from `.zappignore` in the served root (one glob per line,
//! blank lines and `#` comments skipped) and from `[serve] ignore`.
//! They filter change events only; request resolution never consults them.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use super::ConfigError;

/// Project-local ignore file name.
pub const IGNORE_FILE: &str = ".zappignore";

/// Always ignored, regardless of user patterns.
const BUILTIN_PATTERNS: &[&str] = &[".git"];

/// Compiled ignore globs, matched against root-relative paths.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    root: PathBuf,
    globs: GlobSet,
}

impl IgnoreSet {
    /// Compile `patterns` (plus the builtin ones) for paths under `root`.
    pub fn new<I, S>(root: &Path, patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let builtin = BUILTIN_PATTERNS.iter().map(|p| p.to_string());
        let user = patterns.into_iter().map(|p| p.as_ref().to_string());

        for pattern in builtin.chain(user) {
            for expanded in expand_pattern(&pattern) {
                let glob = GlobBuilder::new(&expanded)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| ConfigError::Pattern(pattern.clone(), e))?;
                builder.add(glob);
            }
        }

        let globs = builder
            .build()
            .map_err(|e| ConfigError::Pattern(String::from("<set>"), e))?;

        Ok(Self {
            root: root.to_path_buf(),
            globs,
        })
    }

    /// Load `.zappignore` from `root` (if present) and merge `extra`.
    pub fn load(root: &Path, extra: &[String]) -> Result<Self, ConfigError> {
        let path = root.join(IGNORE_FILE);
        let mut patterns = match fs::read_to_string(&path) {
            Ok(content) => parse_ignore_file(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(ConfigError::Io(path, e)),
        };
        patterns.extend(extra.iter().cloned());
        Self::new(root, patterns)
    }

    /// Whether `path` (absolute under root, or root-relative) is ignored.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.globs.is_match(relative)
    }
}

/// Parse ignore file content into raw patterns.
pub fn parse_ignore_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Expand one user pattern into the globs that implement it.
///
/// - a leading `/` anchors the pattern to the root
/// - a pattern without `/` matches at any depth
/// - every pattern also covers everything beneath a matching directory
fn expand_pattern(pattern: &str) -> Vec<String> {
    let trimmed = pattern.trim_end_matches('/');
    let (anchored, body) = match trimmed.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if body.is_empty() {
        return Vec::new();
    }

    let base = if anchored || body.contains('/') {
        body.to_string()
    } else {
        format!("**/{body}")
    };

    vec![format!("{base}/**"), base]
}
