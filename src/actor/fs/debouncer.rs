use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::article::source::is_temp_file;

/// Sleep used when nothing is pending.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// Pure debouncer: timing and per-path coalescing only.
///
/// Every accepted event restarts the quiet window. There is no upper bound:
/// a continuous stream of events postpones the flush until it stops.
pub(super) struct Debouncer {
    window: Duration,
    /// Path → ChangeKind (one entry per path)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notify event.
    ///
    /// Coalescing per path:
    /// - Removed → Created/Modified: restored, keep the new kind
    /// - Modified → Removed: deleted
    /// - Created → Removed: appeared and vanished, dropped
    /// - anything else: first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kinds: Vec<(&PathBuf, ChangeKind)> = match event.kind {
            EventKind::Create(_) => tag(&event.paths, ChangeKind::Created),
            EventKind::Remove(_) => tag(&event.paths, ChangeKind::Removed),
            // Metadata-only changes (mtime/chmod) carry no content
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                tag(&event.paths, ChangeKind::Removed)
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                tag(&event.paths, ChangeKind::Created)
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
                vec![
                    (&event.paths[0], ChangeKind::Removed),
                    (&event.paths[1], ChangeKind::Created),
                ]
            }
            EventKind::Modify(_) => tag(&event.paths, ChangeKind::Modified),
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for (path, kind) in kinds {
            if is_temp_file(path) {
                continue;
            }
            self.record(path.clone(), kind);
        }
    }

    fn record(&mut self, path: PathBuf, kind: ChangeKind) {
        if let Some(&existing) = self.changes.get(&path) {
            match (existing, kind) {
                (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                    crate::debug!("watch"; "restore {}->{}: {}", existing.label(), kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                (ChangeKind::Modified, ChangeKind::Removed) => {
                    crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                    self.changes.insert(path, ChangeKind::Removed);
                }
                (ChangeKind::Created, ChangeKind::Removed) => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                _ => {}
            }
        } else {
            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
        }
        self.last_event = Some(Instant::now());
    }

    pub(super) fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.window)
    }

    /// Take the coalesced changes once the quiet window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        (!changes.is_empty()).then_some(changes)
    }

    /// Time until the pending batch becomes ready.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE_SLEEP;
        };

        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

fn tag(paths: &[PathBuf], kind: ChangeKind) -> Vec<(&PathBuf, ChangeKind)> {
    paths.iter().map(|p| (p, kind)).collect()
}
