//! Store actor: applies reload requests and publishes the resulting events.
//!
//! File reads and parsing run on the blocking pool; reloads of different
//! slugs in one batch run side by side, and the store itself serializes
//! reloads of the same slug.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::messages::StoreMsg;
use crate::article::{ArticleError, ChangeEvent, Reloaded};
use crate::delivery::Delivery;
use crate::logger;

pub struct StoreActor {
    rx: mpsc::Receiver<StoreMsg>,
    delivery: Arc<Delivery>,
}

/// What one reload produced
enum Outcome {
    Changed(ChangeEvent),
    Unchanged,
    Removed(ChangeEvent),
    Failed(ArticleError),
}

impl StoreActor {
    pub fn new(rx: mpsc::Receiver<StoreMsg>, delivery: Arc<Delivery>) -> Self {
        Self { rx, delivery }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                StoreMsg::Reload { slugs } => self.reload(slugs).await,
                StoreMsg::Rescan => self.rescan().await,
                StoreMsg::Shutdown => {
                    crate::debug!("store"; "shutting down");
                    break;
                }
            }
        }
    }

    async fn reload(&self, slugs: Vec<String>) {
        let store = Arc::clone(self.delivery.store());

        // A vanished directory looks like every file being deleted; keep
        // serving what we have until the watcher re-acquires it.
        if !store.dir().is_dir() {
            crate::debug!("store"; "directory unavailable, ignoring {} change(s)", slugs.len());
            return;
        }

        let mut tasks = JoinSet::new();
        for slug in slugs {
            let store = Arc::clone(&store);
            tasks.spawn_blocking(move || {
                let existed = store.contains(&slug);
                let outcome = match store.reload(&slug) {
                    Ok(Reloaded { changed: true, article }) => {
                        Outcome::Changed(ChangeEvent::updated(&article))
                    }
                    Ok(Reloaded { changed: false, .. }) => Outcome::Unchanged,
                    Err(ArticleError::NotFound { .. }) if existed => {
                        Outcome::Removed(ChangeEvent::removed(slug.clone()))
                    }
                    Err(ArticleError::NotFound { .. }) => Outcome::Unchanged,
                    Err(e) => Outcome::Failed(e),
                };
                (slug, outcome)
            });
        }

        let mut updated = Vec::new();
        let mut removed = Vec::new();
        let mut failed = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (slug, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    crate::log!("error"; "reload task failed: {}", e);
                    continue;
                }
            };
            match outcome {
                Outcome::Changed(event) => {
                    self.publish(&event);
                    updated.push(slug);
                }
                Outcome::Removed(event) => {
                    self.publish(&event);
                    removed.push(slug);
                }
                Outcome::Unchanged => crate::debug!("store"; "unchanged: {}", slug),
                Outcome::Failed(e) => failed.push(e),
            }
        }

        report(&updated, &removed, &failed);
    }

    async fn rescan(&self) {
        let store = Arc::clone(self.delivery.store());
        let refreshed = match tokio::task::spawn_blocking(move || store.refresh()).await {
            Ok(Ok(refreshed)) => refreshed,
            Ok(Err(e)) => {
                logger::status_warning(&e.to_string());
                return;
            }
            Err(e) => {
                crate::log!("error"; "rescan task failed: {}", e);
                return;
            }
        };

        crate::log!("watch"; "rescanned: {} change(s)", refreshed.events.len());
        for event in &refreshed.events {
            self.publish(event);
        }
    }

    fn publish(&self, event: &ChangeEvent) {
        let delivered = self.delivery.publish(event);
        crate::debug!("store"; "{:?} {} -> {} subscriber(s)", event.kind, event.slug, delivered);
    }
}

/// Summarize a batch in the status block.
fn report(updated: &[String], removed: &[String], failed: &[ArticleError]) {
    if !failed.is_empty() {
        let detail = failed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        logger::status_error(
            &format!("{} article(s) failed to parse, keeping last good version", failed.len()),
            &detail,
        );
        return;
    }

    let mut parts = Vec::new();
    if !updated.is_empty() {
        parts.push(format!("updated: {}", updated.join(", ")));
    }
    if !removed.is_empty() {
        parts.push(format!("removed: {}", removed.join(", ")));
    }
    if !parts.is_empty() {
        logger::status_success(&parts.join("; "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{ArticleStore, StoreOptions};
    use crate::delivery::DeliveryOptions;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup(files: &[(&str, &str)]) -> (TempDir, Arc<Delivery>) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let store = Arc::new(ArticleStore::new(StoreOptions::new(temp.path())));
        store.load_all().unwrap();
        let delivery = Delivery::new(
            store,
            DeliveryOptions {
                site_title: "Blog".into(),
                live_reload: false,
            },
        );
        (temp, Arc::new(delivery))
    }

    fn spawn(delivery: &Arc<Delivery>) -> mpsc::Sender<StoreMsg> {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(StoreActor::new(rx, Arc::clone(delivery)).run());
        tx
    }

    async fn next(sub: &mut crate::delivery::Subscription) -> ChangeEvent {
        tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_edit_reaches_subscriber_once() {
        let (temp, delivery) = setup(&[("test.md", "---\ntitle: Test\n---\n# Hello")]);
        let mut sub = delivery.subscribe();
        let tx = spawn(&delivery);

        fs::write(temp.path().join("test.md"), "---\ntitle: Test\n---\n# Hello World").unwrap();
        tx.send(StoreMsg::Reload {
            slugs: vec!["test".into()],
        })
        .await
        .unwrap();

        let event = next(&mut sub).await;
        assert_eq!(event, ChangeEvent::updated(&delivery.store().get("test").unwrap()));
        assert_eq!(event.html, "<h1>Hello World</h1>\n");

        // Same content again: nothing new is pushed
        tx.send(StoreMsg::Reload {
            slugs: vec!["test".into()],
        })
        .await
        .unwrap();
        tx.send(StoreMsg::Shutdown).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_deleted_file_publishes_removal() {
        let (temp, delivery) = setup(&[("gone.md", "# Gone")]);
        let mut sub = delivery.subscribe();
        let tx = spawn(&delivery);

        fs::remove_file(temp.path().join("gone.md")).unwrap();
        tx.send(StoreMsg::Reload {
            slugs: vec!["gone".into()],
        })
        .await
        .unwrap();

        let event = next(&mut sub).await;
        assert_eq!(event, ChangeEvent::removed("gone"));
        assert!(delivery.store().list().is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_publishes_nothing() {
        let (temp, delivery) = setup(&[("a.md", "---\ntitle: Good\n---\n")]);
        let mut sub = delivery.subscribe();
        let tx = spawn(&delivery);

        fs::write(temp.path().join("a.md"), "---\ntitle: Broken").unwrap();
        tx.send(StoreMsg::Reload {
            slugs: vec!["a".into()],
        })
        .await
        .unwrap();
        tx.send(StoreMsg::Shutdown).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(sub.try_recv().is_none());
        assert_eq!(delivery.store().get("a").unwrap().title, "Good");
    }

    #[tokio::test]
    async fn test_rescan_publishes_differences() {
        let (temp, delivery) = setup(&[("a.md", "# A")]);
        let mut sub = delivery.subscribe();
        let tx = spawn(&delivery);

        fs::write(temp.path().join("b.md"), "# B").unwrap();
        tx.send(StoreMsg::Rescan).await.unwrap();

        let event = next(&mut sub).await;
        assert_eq!(event, ChangeEvent::updated(&delivery.store().get("b").unwrap()));
    }
}
