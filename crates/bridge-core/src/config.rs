//! Bridge configuration
//!
//! Loaded from a JSON file next to the server install. A missing file is
//! replaced with defaults written back to disk so operators have a template
//! to edit.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// WebSocket endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketEndpoint {
    /// Base URL of the bridge endpoint
    pub url: String,
    /// Auth token, appended as a query parameter when non-empty
    pub token: String,
}

impl Default for WebSocketEndpoint {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:4001/mc-bridge".to_string(),
            token: String::new(),
        }
    }
}

impl WebSocketEndpoint {
    /// Build the full connection URL with identification query parameters
    pub fn full_url(&self, server_id: &str) -> String {
        let mut url = self.url.clone();
        url.push(if self.url.contains('?') { '&' } else { '?' });
        url.push_str("from=mc");
        url.push_str("&serverId=");
        url.push_str(server_id);

        if !self.token.is_empty() {
            url.push_str("&token=");
            url.push_str(&self.token);
        }

        url
    }
}

/// Bridge configuration, immutable for the lifetime of one client instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Master switch; when false the bridge never starts
    pub enabled: bool,
    /// Identifier reported to the remote endpoint
    pub server_id: String,
    /// Endpoint settings
    pub websocket: WebSocketEndpoint,
    /// Seconds between player-list reports
    pub player_list_interval: u64,
    /// Seconds between heartbeats
    pub heartbeat_interval: u64,
    /// Whether to retry after a lost connection
    pub auto_reconnect: bool,
    /// Seconds between reconnect attempts
    pub reconnect_interval: u64,
    /// Reconnect attempt ceiling; `<= 0` means unlimited
    pub max_reconnect_attempts: i32,
    /// Verbose per-message logging
    pub debug: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_id: "fabric-server-1".to_string(),
            websocket: WebSocketEndpoint::default(),
            player_list_interval: 30,
            heartbeat_interval: 30,
            auto_reconnect: true,
            reconnect_interval: 30,
            max_reconnect_attempts: -1,
            debug: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let json = std::fs::read_to_string(path)?;
            let config: BridgeConfig = serde_json::from_str(&json)
                .map_err(|e| BridgeError::Config(format!("{}: {}", path.display(), e)))?;
            return Ok(config);
        }

        let config = BridgeConfig::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write configuration as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Validate that `url` carries a WebSocket-family scheme
///
/// Surfaced before any network attempt; a bad scheme is a configuration
/// error, not a connect failure.
pub fn check_ws_scheme(url: &str) -> Result<()> {
    let scheme = url.split("://").next().unwrap_or("");
    match scheme {
        "ws" | "wss" => Ok(()),
        other => Err(BridgeError::Config(format!("Invalid protocol: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BridgeConfig::default();
        assert!(config.enabled);
        assert_eq!(config.server_id, "fabric-server-1");
        assert_eq!(config.websocket.url, "ws://127.0.0.1:4001/mc-bridge");
        assert_eq!(config.player_list_interval, 30);
        assert_eq!(config.max_reconnect_attempts, -1);
        assert!(config.auto_reconnect);
        assert!(!config.debug);
    }

    #[test]
    fn test_full_url_without_token() {
        let endpoint = WebSocketEndpoint::default();
        assert_eq!(
            endpoint.full_url("srv-1"),
            "ws://127.0.0.1:4001/mc-bridge?from=mc&serverId=srv-1"
        );
    }

    #[test]
    fn test_full_url_with_token() {
        let endpoint = WebSocketEndpoint {
            url: "wss://bridge.example.com/mc".to_string(),
            token: "s3cret".to_string(),
        };
        assert_eq!(
            endpoint.full_url("srv-1"),
            "wss://bridge.example.com/mc?from=mc&serverId=srv-1&token=s3cret"
        );
    }

    #[test]
    fn test_full_url_with_existing_query() {
        let endpoint = WebSocketEndpoint {
            url: "ws://localhost:4001/mc?env=dev".to_string(),
            token: String::new(),
        };
        assert_eq!(
            endpoint.full_url("a"),
            "ws://localhost:4001/mc?env=dev&from=mc&serverId=a"
        );
    }

    #[test]
    fn test_scheme_check() {
        assert!(check_ws_scheme("ws://localhost:4001/mc").is_ok());
        assert!(check_ws_scheme("wss://bridge.example.com/mc").is_ok());
        assert!(check_ws_scheme("http://localhost:4001/mc").is_err());
        assert!(check_ws_scheme("localhost:4001").is_err());
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: BridgeConfig = serde_json::from_str(r#"{"serverId": "east-1"}"#).unwrap();
        assert_eq!(config.server_id, "east-1");
        assert_eq!(config.heartbeat_interval, 30);
        assert!(config.auto_reconnect);
    }

    #[test]
    fn test_load_writes_defaults_for_missing_file() {
        let dir = std::env::temp_dir().join(format!("webbridge-test-{}", std::process::id()));
        let path = dir.join("webbridge.json");
        let _ = std::fs::remove_file(&path);

        let config = BridgeConfig::load(&path).unwrap();
        assert!(config.enabled);
        assert!(path.exists());

        let reloaded = BridgeConfig::load(&path).unwrap();
        assert_eq!(reloaded.server_id, config.server_id);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
