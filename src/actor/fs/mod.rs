//! Filesystem actor.
//!
//! Watches the article directory and sends debounced reload requests to the
//! store actor. The watcher is created before the first scan finishes so no
//! edit falls into a gap.
//!
//! ```text
//! notify ──► Debouncer (timing, coalescing) ──► router (slugs) ──► StoreMsg
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::StoreMsg;

// Pure timing and deduplication.
mod debouncer;
// Debounced batch -> StoreMsg.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


use debouncer::Debouncer;
use router::batch_to_message;
use watch_roots::{RootStatus, WatchRoots};

use types::{WatchError, WatchState};

/// Watcher settings
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
    /// Quiet period before a batch is flushed
    pub debounce: Duration,
    /// Interval between re-attach attempts while idle
    pub retry: Duration,
}

/// FileSystem actor - watches the article directory
pub struct FsActor {
    /// Raw notify results (sync side of the bridge, taken by `run`)
    notify_rx: Option<std::sync::mpsc::Receiver<notify::Result<notify::Event>>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    roots: WatchRoots,
    store_tx: mpsc::Sender<StoreMsg>,
    debouncer: Debouncer,
    options: WatchOptions,
    state: WatchState,
    last_check: Instant,
}

impl FsActor {
    /// Create the watcher and attach it to the directory.
    ///
    /// A missing directory is not an error here: the actor starts `Idle` and
    /// keeps retrying. Only failing to create the watcher itself is.
    pub fn new(options: WatchOptions, store_tx: mpsc::Sender<StoreMsg>) -> Result<Self, WatchError> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut roots = WatchRoots::new(options.dir.clone());
        let state = match roots.attach(&mut watcher) {
            Ok(()) => WatchState::Watching,
            Err(e) => {
                crate::log!("watch"; "{}", e);
                WatchState::Idle
            }
        };

        Ok(Self {
            notify_rx: Some(notify_rx),
            watcher,
            roots,
            store_tx,
            debouncer: Debouncer::new(options.debounce),
            options,
            state,
            last_check: Instant::now(),
        })
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let Some(notify_rx) = self.notify_rx.take() else {
            return;
        };
        let (async_tx, mut async_rx) = mpsc::channel::<notify::Result<notify::Event>>(64);

        // notify is callback based; bridge it into the async world
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                if async_tx.blocking_send(result).is_err() {
                    break;
                }
            }
        });

        crate::debug!("watch"; "{} ({})", self.state.label(), self.roots.root().display());

        loop {
            tokio::select! {
                biased;
                Some(result) = async_rx.recv() => match result {
                    Ok(event) if self.roots.is_root_removal(&event) => {
                        let root = self.roots.root().to_path_buf();
                        self.fail(WatchError::RootLost(root));
                    }
                    Ok(event) => {
                        self.debouncer.add_event(&event);
                        self.sync_state();
                    }
                    Err(e) => self.fail(WatchError::Notify(e)),
                },
                _ = tokio::time::sleep(self.sleep_duration()) => {
                    if self.tick().await.is_err() {
                        break;
                    }
                }
            }
        }

        crate::debug!("watch"; "stopped");
    }

    fn sleep_duration(&self) -> Duration {
        let retry = self.options.retry.saturating_sub(self.last_check.elapsed());
        self.debouncer
            .sleep_duration()
            .min(retry)
            .max(Duration::from_millis(1))
    }

    /// Periodic work: root maintenance and flushing ready batches.
    ///
    /// Returns `Err(())` once the store actor is gone.
    async fn tick(&mut self) -> Result<(), ()> {
        if self.last_check.elapsed() >= self.options.retry {
            self.last_check = Instant::now();
            match self.roots.maintain(&mut self.watcher) {
                RootStatus::Unchanged => {}
                RootStatus::Lost => {
                    let root = self.roots.root().to_path_buf();
                    self.fail(WatchError::RootLost(root));
                }
                RootStatus::Reacquired => {
                    crate::log!("watch"; "watching {} again", self.roots.root().display());
                    self.set_state(WatchState::Watching);
                    self.store_tx.send(StoreMsg::Rescan).await.map_err(|_| ())?;
                }
            }
        }

        if let Some(batch) = self.debouncer.take_if_ready()
            && let Some(msg) = batch_to_message(batch, &self.options.extensions)
        {
            self.store_tx.send(msg).await.map_err(|_| ())?;
        }
        self.sync_state();

        Ok(())
    }

    /// Drop to `Idle`. Pending events stay queued; they are flushed once
    /// their window elapses even while idle.
    fn fail(&mut self, error: WatchError) {
        crate::logger::status_warning(&error.to_string());
        self.roots.detach(&mut self.watcher);
        self.last_check = Instant::now();
        self.set_state(WatchState::Idle);
    }

    fn sync_state(&mut self) {
        if !self.roots.is_attached() {
            self.set_state(WatchState::Idle);
        } else if self.debouncer.is_pending() {
            self.set_state(WatchState::Debouncing);
        } else {
            self.set_state(WatchState::Watching);
        }
    }

    fn set_state(&mut self, state: WatchState) {
        if self.state != state {
            crate::debug!("watch"; "{} -> {}", self.state.label(), state.label());
            self.state = state;
        }
    }
}
