//! WebSocket actor - pushes change events to browsers.
//!
//! ```text
//! listener thread --AddClient--> WsActor <--wake-- Hub (publish)
//!                                   │
//!                                   └── per client: Subscription -> socket
//! ```
//!
//! Each connected client owns its own `Subscription`. A client that fails a
//! send or closes its socket is dropped, which also unsubscribes it.

mod client_io;
mod push;
mod server;

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::delivery::{Delivery, Subscription};

pub use server::start_ws_server;

/// How often clients are polled for close frames and pending writes
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A connected client and its event feed
struct Client {
    ws: WebSocket<TcpStream>,
    subscription: Subscription,
}

/// WebSocket actor - owns all client connections
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    delivery: Arc<Delivery>,
    clients: Vec<Client>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, delivery: Arc<Delivery>) -> Self {
        Self {
            rx,
            delivery,
            clients: Vec::new(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let wake = self.delivery.hub().wake_handle();
        let mut poll = tokio::time::interval(POLL_INTERVAL);

        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(WsMsg::AddClient(ws)) => self.add_client(ws),
                    Some(WsMsg::Shutdown) | None => {
                        crate::debug!("ws"; "shutting down");
                        self.close_all();
                        break;
                    }
                },
                _ = wake.notified() => self.push_pending(),
                _ = poll.tick() => {
                    self.poll_clients();
                    self.push_pending();
                }
            }
        }
    }
}
