use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{StoreMsg, WsMsg};
use crate::actor::store::StoreActor;
use crate::actor::ws::WsActor;

/// How long actors get to finish after `Shutdown`
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Run all actors concurrently until shutdown (or until one of them exits).
pub(super) async fn run_actors(
    fs: FsActor,
    store: StoreActor,
    ws: WsActor,
    store_tx: mpsc::Sender<StoreMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = tokio::spawn(async move { fs.run().await });
    let mut store_handle = tokio::spawn(async move { store.run().await });
    let mut ws_handle = tokio::spawn(async move { ws.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if store_handle.is_finished() || ws_handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = &mut store_handle => {}
            _ = &mut ws_handle => {}
        }
    }

    // The watcher holds no state worth draining
    fs_handle.abort();

    let _ = store_tx.send(StoreMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;

    for handle in [store_handle, ws_handle] {
        if !handle.is_finished() {
            let _ = tokio::time::timeout(DRAIN_TIMEOUT, handle).await;
        }
    }
}
