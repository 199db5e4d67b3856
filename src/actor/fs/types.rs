use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::{CreateKind, ModifyKind, RemoveKind};

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// One filesystem change, already normalized from the watcher's event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
    pub is_directory: bool,
}

impl ChangeEvent {
    /// Map a raw watcher event to change events, one per path.
    ///
    /// Metadata-only modifications and access events produce nothing. When
    /// the event kind does not say whether the path is a directory, the
    /// filesystem is asked; a path that cannot be inspected is dropped.
    pub(super) fn from_notify(event: &notify::Event) -> Vec<Self> {
        let (kind, dir_hint) = match event.kind {
            EventKind::Create(create) => (ChangeKind::Added, create_dir_hint(create)),
            EventKind::Remove(remove) => (ChangeKind::Removed, remove_dir_hint(remove)),
            EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
            EventKind::Modify(ModifyKind::Name(_)) => {
                // A rename reports each side; existence tells which one.
                return event
                    .paths
                    .iter()
                    .filter_map(|path| {
                        let kind = if path.exists() {
                            ChangeKind::Added
                        } else {
                            ChangeKind::Removed
                        };
                        Self::with_kind(kind, path, None)
                    })
                    .collect();
            }
            EventKind::Modify(_) => (ChangeKind::Modified, None),
            _ => return Vec::new(),
        };

        event
            .paths
            .iter()
            .filter_map(|path| Self::with_kind(kind, path, dir_hint))
            .collect()
    }

    fn with_kind(kind: ChangeKind, path: &Path, dir_hint: Option<bool>) -> Option<Self> {
        let is_directory = match dir_hint {
            Some(is_dir) => is_dir,
            // A removed path cannot be inspected any more.
            None if kind == ChangeKind::Removed => false,
            None => match path.metadata() {
                Ok(meta) => meta.is_dir(),
                Err(e) => {
                    crate::debug!("watch"; "dropping event for {}: {}", path.display(), e);
                    return None;
                }
            },
        };

        Some(Self {
            kind,
            path: path.to_path_buf(),
            is_directory,
        })
    }
}

fn create_dir_hint(kind: CreateKind) -> Option<bool> {
    match kind {
        CreateKind::File => Some(false),
        CreateKind::Folder => Some(true),
        _ => None,
    }
}

fn remove_dir_hint(kind: RemoveKind) -> Option<bool> {
    match kind {
        RemoveKind::File => Some(false),
        RemoveKind::Folder => Some(true),
        _ => None,
    }
}

/// Check if path is a temp/backup file (editor artifacts).
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp") || name.ends_with('~')
}
