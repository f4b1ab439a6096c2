//! Bridge service wiring
//!
//! One explicitly owned [`WebBridge`] instance per game server. The host
//! drives it through the [`HostEvents`] surface; everything else (client
//! lifecycle, reporter creation) happens internally.

use crate::host::{HostEvents, MainThread, StatusSource};
use crate::reporter::StatusReporter;
use bridge_client::{BridgeClient, Connector, WsConnector};
use bridge_core::BridgeConfig;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

struct BridgeInner {
    config: BridgeConfig,
    main: MainThread,
    source: Arc<dyn StatusSource>,
    connector: Arc<dyn Connector>,
    client: Mutex<Option<BridgeClient>>,
    reporter: Mutex<Option<StatusReporter>>,
    rt: tokio::runtime::Handle,
}

/// Bridges one game server to the web endpoint
///
/// Must be constructed inside a tokio runtime; host callbacks may arrive
/// from any thread and are dispatched onto that runtime.
#[derive(Clone)]
pub struct WebBridge {
    inner: Arc<BridgeInner>,
}

impl WebBridge {
    pub fn new(config: BridgeConfig, main: MainThread, source: Arc<dyn StatusSource>) -> Self {
        Self::with_connector(config, main, source, Arc::new(WsConnector))
    }

    pub fn with_connector(
        config: BridgeConfig,
        main: MainThread,
        source: Arc<dyn StatusSource>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                config,
                main,
                source,
                connector,
                client: Mutex::new(None),
                reporter: Mutex::new(None),
                rt: tokio::runtime::Handle::current(),
            }),
        }
    }

    /// Whether a client currently exists (started and not yet shut down)
    pub async fn is_active(&self) -> bool {
        self.inner.client.lock().await.is_some()
    }

    /// Create and start the client; reporter creation is deferred to the
    /// first successful connect
    pub async fn start_bridge(&self) {
        if !self.inner.config.enabled {
            info!("Web bridge disabled in config");
            return;
        }

        let mut slot = self.inner.client.lock().await;
        if slot.is_some() {
            warn!("Bridge already started");
            return;
        }

        info!("Server started, connecting to bridge endpoint...");
        let client = BridgeClient::new(self.inner.config.clone(), self.inner.connector.clone());

        let bridge = self.clone();
        let reporter_client = client.clone();
        client
            .set_on_connected(move || {
                let bridge = bridge.clone();
                let client = reporter_client.clone();
                bridge.inner.rt.clone().spawn(async move {
                    bridge.on_connected(client).await;
                });
            })
            .await;

        client.start().await;
        *slot = Some(client);
    }

    /// First connect creates and starts the reporter; reconnects just push
    /// a fresh player list
    async fn on_connected(&self, client: BridgeClient) {
        let mut slot = self.inner.reporter.lock().await;
        match &*slot {
            Some(reporter) => {
                let reporter = reporter.clone();
                drop(slot);
                reporter.report_player_list().await;
            }
            None => {
                let reporter = StatusReporter::new(
                    self.inner.config.clone(),
                    client,
                    self.inner.main.clone(),
                    self.inner.source.clone(),
                );
                reporter.start().await;
                *slot = Some(reporter);
            }
        }
    }

    /// Stop reporter and client; idempotent
    pub async fn shutdown(&self) {
        if let Some(reporter) = self.inner.reporter.lock().await.take() {
            reporter.stop().await;
        }
        if let Some(client) = self.inner.client.lock().await.take() {
            client.stop().await;
        }
    }

    /// Ad-hoc player-list report, used for join/leave notifications
    pub async fn report_now(&self) {
        let reporter = self.inner.reporter.lock().await.clone();
        if let Some(reporter) = reporter {
            reporter.report_player_list().await;
        }
    }
}

impl HostEvents for WebBridge {
    fn on_server_started(&self) {
        let bridge = self.clone();
        self.inner.rt.spawn(async move {
            bridge.start_bridge().await;
        });
    }

    fn on_server_stopping(&self) {
        info!("Server stopping, disconnecting...");
        let bridge = self.clone();
        self.inner.rt.spawn(async move {
            bridge.shutdown().await;
        });
    }

    fn on_player_join(&self) {
        let bridge = self.clone();
        self.inner.rt.spawn(async move {
            bridge.report_now().await;
        });
    }

    fn on_player_leave(&self) {
        let bridge = self.clone();
        self.inner.rt.spawn(async move {
            bridge.report_now().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeServer, RecordingConnector, RecordingState, test_config};
    use std::time::Duration;

    fn mock_bridge(config: BridgeConfig) -> (WebBridge, Arc<RecordingState>) {
        let state = Arc::new(RecordingState::default());
        let bridge = WebBridge::with_connector(
            config,
            MainThread::start(),
            Arc::new(FakeServer::default()),
            Arc::new(RecordingConnector(state.clone())),
        );
        (bridge, state)
    }

    #[tokio::test]
    async fn test_disabled_config_never_connects() {
        let config = BridgeConfig {
            enabled: false,
            ..test_config()
        };
        let (bridge, state) = mock_bridge(config);

        bridge.start_bridge().await;

        assert!(!bridge.is_active().await);
        assert_eq!(state.connects(), 0);
    }

    #[tokio::test]
    async fn test_start_connects_and_reports() {
        let (bridge, state) = mock_bridge(test_config());

        bridge.start_bridge().await;
        assert!(bridge.is_active().await);
        assert_eq!(state.connects(), 1);

        // on-connected runs on a spawned task; give it a moment
        tokio::time::sleep(Duration::from_millis(100)).await;
        bridge.report_now().await;

        let client = bridge.inner.client.lock().await.clone().unwrap();
        let delivered = state.sent().len() + client.queue_depth().await;
        assert!(delivered >= 2, "only {} messages delivered", delivered);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (bridge, _state) = mock_bridge(test_config());

        bridge.start_bridge().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        bridge.shutdown().await;
        assert!(!bridge.is_active().await);
        bridge.shutdown().await;
        assert!(!bridge.is_active().await);
    }

    #[tokio::test]
    async fn test_start_twice_warns_and_keeps_one_client() {
        let (bridge, state) = mock_bridge(test_config());

        bridge.start_bridge().await;
        bridge.start_bridge().await;

        assert_eq!(state.connects(), 1);
        bridge.shutdown().await;
    }
}
