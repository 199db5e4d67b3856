//! Request path to file resolution.
//!
//! ```text
//! /docs/intro?x=1  →  ["docs", "intro"]  →  ROOT/docs/intro
//!                                             ├── regular file   → Found
//!                                             ├── directory      → first of INDEX_FILES
//!                                             └── missing        → first of ROOT/docs/intro.{FALLBACK_EXTENSIONS}
//! ```
//!
//! Traversal is rejected on the decoded segments before touching the
//! filesystem. A match whose canonical path leaves the root (through a
//! symlink) is reported as not found.

use std::fs;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Extensions tried, in order, when the request names no existing file.
pub const FALLBACK_EXTENSIONS: &[&str] = &["html", "htm", "jinja", "md"];

/// Files tried, in order, when the request names a directory.
pub const INDEX_FILES: &[&str] = &["index.html", "index.htm", "index.jinja", "index.md"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Found(PathBuf),
    NotFound,
}

/// A request path that must not reach the filesystem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("path escapes the served root: {0}")]
    PathEscape(String),

    #[error("request path is not valid UTF-8 after decoding")]
    Malformed,
}

/// Map a request URL onto a file under `root`.
pub fn resolve(url: &str, root: &Path) -> Result<ResolvedTarget, ResolveError> {
    let segments = normalize_url(url)?;
    let joined = segments.iter().fold(root.to_path_buf(), |path, s| path.join(s));

    let found = match fs::metadata(&joined) {
        Ok(meta) if meta.is_file() => Some(joined),
        Ok(meta) if meta.is_dir() => first_file(INDEX_FILES.iter().map(|name| joined.join(name))),
        Ok(_) => None,
        Err(_) if segments.is_empty() => None,
        Err(_) => first_file(
            FALLBACK_EXTENSIONS
                .iter()
                .map(|ext| with_appended_extension(&joined, ext)),
        ),
    };

    Ok(match found {
        Some(path) if is_contained(&path, root) => ResolvedTarget::Found(path),
        Some(path) => {
            crate::debug!("serve"; "symlink escapes root: {}", path.display());
            ResolvedTarget::NotFound
        }
        None => ResolvedTarget::NotFound,
    })
}

/// Decode `url` into safe path segments.
///
/// Query string and fragment are dropped, empty and `.` segments skipped.
fn normalize_url(url: &str) -> Result<Vec<String>, ResolveError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ResolveError::Malformed)?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(ResolveError::PathEscape(decoded.to_string())),
            _ if !is_plain_segment(segment) => {
                return Err(ResolveError::PathEscape(decoded.to_string()));
            }
            _ => segments.push(segment.to_string()),
        }
    }
    Ok(segments)
}

/// A segment that joins as exactly one ordinary path component.
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains(['\\', '\0']) || has_drive_prefix(segment) {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// `C:` style prefix, rejected on every platform.
fn has_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// `about` + `md` → `about.md` (keeps any existing dots intact).
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn first_file(mut candidates: impl Iterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.find(|path| path.is_file())
}

fn is_contained(path: &Path, root: &Path) -> bool {
    match (path.canonicalize(), root.canonicalize()) {
        (Ok(path), Ok(root)) => path.starts_with(root),
        _ => false,
    }
}
