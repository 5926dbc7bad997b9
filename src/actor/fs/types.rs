use std::path::PathBuf;

use thiserror::Error;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Watcher lifecycle
///
/// ```text
/// Idle ──attach──► Watching ──event──► Debouncing ──quiet──► Watching
///  ▲                  │                    │
///  └──────error───────┴────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Not attached to the directory (startup or after a failure)
    Idle,
    Watching,
    /// Events pending, waiting for the quiet period
    Debouncing,
}

impl WatchState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Watching => "watching",
            Self::Debouncing => "debouncing",
        }
    }
}

/// Lost access to the watched directory. Never fatal: the watcher goes idle
/// and keeps trying to re-attach.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("watched directory is gone: {}", .0.display())]
    RootLost(PathBuf),
}
