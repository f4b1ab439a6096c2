//! Periodic status reporter
//!
//! Builds player-list and heartbeat payloads from game state and hands them
//! to the client's queue. All state reads hop through [`MainThread`], never
//! racing game-logic mutation. Skips quietly while disconnected.

use crate::host::{MainThread, StatusSource};
use bridge_client::BridgeClient;
use bridge_core::{BridgeConfig, epoch_millis, heartbeat_message, player_list_message};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Default)]
struct ReporterTasks {
    report: Option<JoinHandle<()>>,
    heartbeat: Option<JoinHandle<()>>,
}

struct ReporterInner {
    config: BridgeConfig,
    client: BridgeClient,
    main: MainThread,
    source: Arc<dyn StatusSource>,
    tasks: Mutex<ReporterTasks>,
}

/// Reports the player roster and tick performance on a fixed cadence, plus
/// on demand when players join or leave
#[derive(Clone)]
pub struct StatusReporter {
    inner: Arc<ReporterInner>,
}

impl StatusReporter {
    pub fn new(
        config: BridgeConfig,
        client: BridgeClient,
        main: MainThread,
        source: Arc<dyn StatusSource>,
    ) -> Self {
        Self {
            inner: Arc::new(ReporterInner {
                config,
                client,
                main,
                source,
                tasks: Mutex::new(ReporterTasks::default()),
            }),
        }
    }

    /// Send an initial report and arm both timers
    pub async fn start(&self) {
        self.report_player_list().await;

        let report_secs = self.inner.config.player_list_interval.max(1);
        let heartbeat_secs = self.inner.config.heartbeat_interval.max(1);

        let reporter = self.clone();
        let report = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(report_secs));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                reporter.report_player_list().await;
            }
        });

        let reporter = self.clone();
        let heartbeat = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(heartbeat_secs));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                reporter.send_heartbeat().await;
            }
        });

        let mut tasks = self.inner.tasks.lock().await;
        if let Some(old) = tasks.report.replace(report) {
            old.abort();
        }
        if let Some(old) = tasks.heartbeat.replace(heartbeat) {
            old.abort();
        }

        info!(
            "Reporter started (playerList: {}s, heartbeat: {}s)",
            report_secs, heartbeat_secs
        );
    }

    /// Cancel both timers; safe to call repeatedly
    pub async fn stop(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        if let Some(handle) = tasks.report.take() {
            handle.abort();
        }
        if let Some(handle) = tasks.heartbeat.take() {
            handle.abort();
        }
    }

    /// Build and enqueue one player-list report from current game state
    pub async fn report_player_list(&self) {
        if !self.inner.client.is_connected().await {
            return;
        }

        let source = self.inner.source.clone();
        let status = match self.inner.main.call(move || source.status()).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to read server status: {}", e);
                return;
            }
        };

        let online = status.players.len();
        match player_list_message(
            &self.inner.config.server_id,
            status.players,
            status.mspt,
            epoch_millis(),
        ) {
            Ok(json) => {
                self.inner.client.enqueue(json).await;
                if self.inner.config.debug {
                    info!("Enqueued player list: {} players", online);
                } else {
                    debug!("Enqueued player list: {} players", online);
                }
            }
            Err(e) => warn!("Failed to build player list: {}", e),
        }
    }

    /// Build and enqueue one liveness heartbeat
    ///
    /// Hops through the game thread like the player list, keeping all
    /// outbound builds serialized with game-state mutation.
    async fn send_heartbeat(&self) {
        if !self.inner.client.is_connected().await {
            return;
        }

        let server_id = self.inner.config.server_id.clone();
        let built = self
            .inner
            .main
            .call(move || heartbeat_message(&server_id, epoch_millis()))
            .await;

        match built {
            Ok(Ok(json)) => {
                self.inner.client.enqueue(json).await;
                if self.inner.config.debug {
                    info!("Enqueued heartbeat");
                } else {
                    debug!("Enqueued heartbeat");
                }
            }
            Ok(Err(e)) => warn!("Failed to build heartbeat: {}", e),
            Err(e) => warn!("Failed to reach game thread: {}", e),
        }
    }
}
