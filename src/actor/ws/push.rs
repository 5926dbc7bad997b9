use tungstenite::protocol::Message;

use super::WsActor;
use super::client_io::is_would_block;

impl WsActor {
    /// Forward queued change events to each client.
    ///
    /// Sockets are non-blocking: a slow client only buffers inside
    /// tungstenite, a broken one is dropped. Neither holds up the others.
    pub(super) fn push_pending(&mut self) {
        self.clients.retain_mut(|client| {
            while let Some(event) = client.subscription.try_recv() {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        crate::log!("ws"; "failed to encode event: {}", e);
                        continue;
                    }
                };

                match client.ws.send(Message::Text(json.into())) {
                    Ok(()) => {
                        crate::debug!("ws"; "sent {:?} {} to client {}", event.kind, event.slug, client.subscription.id());
                    }
                    Err(ref e) if is_would_block(e) => {}
                    Err(e) => {
                        crate::debug!("ws"; "client {} dropped: {}", client.subscription.id(), e);
                        return false;
                    }
                }
            }
            true
        });
    }
}
