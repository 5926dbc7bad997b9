//! Actor Coordinator - wires up the live update actor system
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Starts the WebSocket listener
//! - Wires up actors and runs them until shutdown

mod runtime;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, WatchOptions};
use super::messages::{StoreMsg, WsMsg};
use super::store::StoreActor;
use super::ws::{WsActor, start_ws_server};
use crate::config::FolioConfig;
use crate::delivery::Delivery;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<FolioConfig>,
    delivery: Arc<Delivery>,
    shutdown_rx: Option<Receiver<()>>,
    on_ws_bound: Option<Box<dyn FnOnce(u16) + Send>>,
}

impl Coordinator {
    pub fn new(config: Arc<FolioConfig>, delivery: Arc<Delivery>) -> Self {
        Self {
            config,
            delivery,
            shutdown_rx: None,
            on_ws_bound: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Called with the WebSocket port once the listener is bound.
    pub fn on_ws_bound(mut self, f: impl FnOnce(u16) + Send + 'static) -> Self {
        self.on_ws_bound = Some(Box::new(f));
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (store_tx, store_rx) = mpsc::channel::<StoreMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let interface = self.config.serve.interface;
        match start_ws_server(interface, self.config.serve.ws_port, ws_tx.clone()) {
            Ok(port) => {
                crate::debug!("ws"; "listening on {}:{}", interface, port);
                if let Some(f) = self.on_ws_bound.take() {
                    f(port);
                }
            }
            Err(e) => crate::log!("ws"; "websocket server failed: {}", e),
        }

        let options = WatchOptions {
            dir: self.config.content_dir().to_path_buf(),
            extensions: self.config.content.extensions.clone(),
            debounce: self.config.watch.debounce(),
            retry: self.config.watch.retry(),
        };
        let fs_actor = FsActor::new(options, store_tx.clone())
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        // Edits between the initial load and attaching the watcher
        store_tx.send(StoreMsg::Rescan).await?;

        let store_actor = StoreActor::new(store_rx, Arc::clone(&self.delivery));
        let ws_actor = WsActor::new(ws_rx, Arc::clone(&self.delivery));

        crate::debug!("actor"; "start");
        runtime::run_actors(
            fs_actor,
            store_actor,
            ws_actor,
            store_tx,
            ws_tx,
            self.shutdown_rx.take(),
        )
        .await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
