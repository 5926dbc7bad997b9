use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::types::WatchError;

/// Result of a maintenance pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RootStatus {
    Unchanged,
    /// Was attached, directory is gone
    Lost,
    /// Was detached, attached again
    Reacquired,
}

/// Keeps the article directory attached to the watcher.
///
/// Only the directory itself is watched; articles never live in
/// subdirectories. The directory's identity is recorded on attach so a
/// replaced directory (same path, new inode) counts as lost.
pub(super) struct WatchRoots {
    root: PathBuf,
    attached: Option<DirId>,
}

/// `(device, inode)` on unix
type DirId = (u64, u64);

#[cfg(unix)]
fn dir_id(path: &Path) -> Option<DirId> {
    use std::os::unix::fs::MetadataExt;
    let meta = std::fs::metadata(path).ok().filter(|m| m.is_dir())?;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn dir_id(path: &Path) -> Option<DirId> {
    path.is_dir().then_some((0, 0))
}

impl WatchRoots {
    pub(super) fn new(root: PathBuf) -> Self {
        Self {
            root,
            attached: None,
        }
    }

    pub(super) fn root(&self) -> &Path {
        &self.root
    }

    pub(super) fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub(super) fn attach(&mut self, watcher: &mut RecommendedWatcher) -> Result<(), WatchError> {
        let Some(id) = dir_id(&self.root) else {
            return Err(WatchError::RootLost(self.root.clone()));
        };
        watcher.watch(&self.root, RecursiveMode::NonRecursive)?;
        self.attached = Some(id);
        Ok(())
    }

    /// Forget the current handle (after a notify error).
    pub(super) fn detach(&mut self, watcher: &mut RecommendedWatcher) {
        if self.attached.take().is_some() {
            let _ = watcher.unwatch(&self.root);
        }
    }

    /// The event says the watched directory itself was deleted or moved away.
    pub(super) fn is_root_removal(&self, event: &Event) -> bool {
        let removal = matches!(
            event.kind,
            EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From | RenameMode::Both))
        );
        removal && self.is_attached() && event.paths.first() == Some(&self.root)
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) -> RootStatus {
        if let Some(id) = self.attached {
            if dir_id(&self.root) == Some(id) {
                return RootStatus::Unchanged;
            }
            self.detach(watcher);
            return RootStatus::Lost;
        }

        match self.attach(watcher) {
            Ok(()) => {
                crate::debug!("watch"; "re-attached watch: {}", self.root.display());
                RootStatus::Reacquired
            }
            Err(_) => RootStatus::Unchanged,
        }
    }
}
