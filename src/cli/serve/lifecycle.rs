//! Server lifecycle management.

use crate::{actor::Coordinator, config::FolioConfig, delivery::Delivery, log};
use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use std::{
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C is pressed, the handler installed in `main` unblocks the
/// server and notifies the actors.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    crate::core::register_server(server, shutdown_tx);
}

/// Spawn the actor system for file watching and live updates.
pub fn spawn_actors(
    config: Arc<FolioConfig>,
    delivery: Arc<Delivery>,
    shutdown_rx: Receiver<()>,
) -> Option<JoinHandle<()>> {
    if !config.serve.watch {
        return None;
    }

    Some(thread::spawn(move || {
        if let Err(e) = run_actor_system(config, delivery, shutdown_rx) {
            log!("actor"; "error: {}", e);
        }
    }))
}

fn run_actor_system(
    config: Arc<FolioConfig>,
    delivery: Arc<Delivery>,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    rt.block_on(
        Coordinator::new(config, delivery)
            .with_shutdown_signal(shutdown_rx)
            .on_ws_bound(super::set_actual_ws_port)
            .run(),
    )
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_bind_with_retry_skips_busy_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (first, first_addr) = bind_with_retry(localhost, 0).unwrap();
        let (_second, second_addr) = bind_with_retry(localhost, first_addr.port()).unwrap();

        assert_ne!(first_addr.port(), 0);
        assert_ne!(first_addr.port(), second_addr.port());
        drop(first);
    }
}
