use std::net::TcpStream;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::{Client, WsActor};

/// First frame sent to every client.
pub(super) fn connected_message() -> String {
    serde_json::json!({ "type": "connected" }).to_string()
}

impl WsActor {
    /// Greet a handshaken connection and subscribe it to change events.
    pub(super) fn add_client(&mut self, mut ws: WebSocket<TcpStream>) {
        if let Err(e) = ws.send(Message::Text(connected_message().into()))
            && !is_would_block(&e)
        {
            crate::debug!("ws"; "failed to send connected message: {}", e);
            return;
        }

        let subscription = self.delivery.subscribe();
        crate::debug!("ws"; "client {} subscribed (total: {})", subscription.id(), self.clients.len() + 1);
        self.clients.push(Client { ws, subscription });
    }

    /// Non-blocking read of every client; drops the ones that closed.
    ///
    /// Clients never send anything meaningful, so incoming frames are only
    /// read to notice disconnects (and to let tungstenite answer pings).
    pub(super) fn poll_clients(&mut self) {
        let before = self.clients.len();
        self.clients.retain_mut(|client| loop {
            match client.ws.read() {
                Ok(Message::Close(_)) => {
                    crate::debug!("ws"; "client {} closed", client.subscription.id());
                    break false;
                }
                Ok(_) => continue,
                Err(ref e) if is_would_block(e) => {
                    // Nothing to read; push out anything still buffered
                    break match client.ws.flush() {
                        Ok(()) => true,
                        Err(ref e) => is_would_block(e),
                    };
                }
                Err(e) => {
                    crate::debug!("ws"; "client {} disconnected: {}", client.subscription.id(), e);
                    break false;
                }
            }
        });
        if self.clients.len() != before {
            crate::debug!("ws"; "{} subscriber(s) left", self.delivery.hub().len());
        }
    }

    pub(super) fn close_all(&mut self) {
        for mut client in self.clients.drain(..) {
            let _ = client.ws.close(None);
            let _ = client.ws.flush();
        }
    }
}

pub(super) fn is_would_block(error: &tungstenite::Error) -> bool {
    matches!(error, tungstenite::Error::Io(e) if e.kind() == std::io::ErrorKind::WouldBlock)
}
