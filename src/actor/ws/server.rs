//! WebSocket listener.
//!
//! Accepts connections on a plain thread. Each handshake runs on its own
//! short-lived thread with socket timeouts, so a peer that never sends the
//! upgrade request holds up nobody; only finished sockets reach the actor.

use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Upper bound on a single handshake read or write
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Start the listener. Returns the port actually bound, which may be above
/// `base_port` when that one is taken.
pub fn start_ws_server(interface: IpAddr, base_port: u16, ws_tx: mpsc::Sender<WsMsg>) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        while !crate::core::is_shutdown() && !ws_tx.is_closed() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("ws"; "client connected: {}", addr);
                    let ws_tx = ws_tx.clone();
                    std::thread::spawn(move || handshake(stream, &ws_tx));
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("ws"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
        crate::debug!("ws"; "listener stopped");
    });

    Ok(actual_port)
}

/// Upgrade an accepted stream and pass it to the actor.
fn handshake(stream: TcpStream, ws_tx: &mpsc::Sender<WsMsg>) {
    let prepared = stream
        .set_nonblocking(false)
        .and_then(|()| stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT)))
        .and_then(|()| stream.set_write_timeout(Some(HANDSHAKE_TIMEOUT)));
    if let Err(e) = prepared {
        crate::debug!("ws"; "failed to prepare socket: {}", e);
        return;
    }

    let ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::debug!("ws"; "handshake failed: {}", e);
            return;
        }
    };

    let socket = ws.get_ref();
    let ready = socket
        .set_read_timeout(None)
        .and_then(|()| socket.set_write_timeout(None))
        .and_then(|()| socket.set_nonblocking(true));
    if let Err(e) = ready {
        crate::debug!("ws"; "failed to switch socket to non-blocking: {}", e);
        return;
    }

    let _ = ws_tx.blocking_send(WsMsg::AddClient(ws));
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                if offset > 0 {
                    crate::log!("ws"; "port {} in use, using {} instead", base_port, actual_port);
                }
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
