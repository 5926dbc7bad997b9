//! Actor message definitions.
//!
//! ```text
//! FsActor --Reload/Rescan--> StoreActor --publish--> Hub ··· WsActor
//!                                                              ^
//! ws listener ----------------AddClient------------------------+
//! ```

use std::fmt;
use std::net::TcpStream;

use tungstenite::WebSocket;

/// Messages to the store actor
#[derive(Debug, PartialEq, Eq)]
pub enum StoreMsg {
    /// Re-read these slugs (each listed once, sorted)
    Reload { slugs: Vec<String> },
    /// Rescan the whole directory (watch re-acquired after a loss)
    Rescan,
    Shutdown,
}

/// Messages to the WebSocket actor
pub enum WsMsg {
    /// Handshaken connection, already in non-blocking mode
    AddClient(WebSocket<TcpStream>),
    Shutdown,
}

impl fmt::Debug for WsMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddClient(ws) => f
                .debug_tuple("AddClient")
                .field(&ws.get_ref().peer_addr().ok())
                .finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
