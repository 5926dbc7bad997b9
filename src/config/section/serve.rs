//! `[serve]` section configuration.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5277                 # HTTP port number
//! ws_port = 35729             # WebSocket port for live updates
//! watch = true                # Watch articles and push changes
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.
//! Both ports are tried upward when taken.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port for the live update channel.
    pub ws_port: u16,

    /// Enable file watcher and live updates.
    pub watch: bool,
}

impl ServeConfig {
    pub const WS_PORT: FieldPath = FieldPath::new("serve.ws_port");

    pub(crate) fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.watch && self.port == self.ws_port {
            diag.error_with_hint(
                Self::WS_PORT,
                format!("same as serve.port ({})", self.port),
                "use a different port for the WebSocket server",
            );
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5277,
            ws_port: 35729,
            watch: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config() {
        let config =
            test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 8080\nwatch = false");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.watch);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 5277);
        assert_eq!(config.serve.ws_port, 35729);
        assert!(config.serve.watch);
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\ninterface = \"::1\"");
        assert_eq!(
            config.serve.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_serve_config_partial_override() {
        let config = test_parse_config("[serve]\nws_port = 4000");

        assert_eq!(config.serve.ws_port, 4000);
        assert_eq!(config.serve.port, 5277);
        assert!(config.serve.watch);
    }

    #[test]
    fn test_port_clash_rejected_only_when_watching() {
        let mut serve = ServeConfig {
            port: 4000,
            ws_port: 4000,
            ..ServeConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        serve.validate(&mut diag);
        let report = diag.into_result().unwrap_err().to_string();
        assert!(report.contains("(1 problem)"));
        assert!(report.contains(ServeConfig::WS_PORT.as_str()));

        serve.watch = false;
        let mut diag = ConfigDiagnostics::new();
        serve.validate(&mut diag);
        assert!(diag.into_result().is_ok());
    }
}
