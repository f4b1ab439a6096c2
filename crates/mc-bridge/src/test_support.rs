//! Shared test doubles for reporter and service tests

use crate::host::{ServerStatus, StatusSource};
use async_trait::async_trait;
use bridge_client::{BridgeClient, ConnectionEvent, Connector, Transport};
use bridge_core::{BridgeConfig, BridgeError, PlayerInfo, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Always-successful connector recording every message it is asked to send
#[derive(Default)]
pub struct RecordingState {
    connects: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl RecordingState {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

pub struct RecordingConnector(pub Arc<RecordingState>);

#[async_trait]
impl Connector for RecordingConnector {
    async fn connect(
        &self,
        _url: &str,
        _timeout: Duration,
        _session: u64,
        _events: mpsc::Sender<ConnectionEvent>,
    ) -> Result<Box<dyn Transport>> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingTransport {
            state: self.0.clone(),
            open: AtomicBool::new(true),
        }))
    }
}

struct RecordingTransport {
    state: Arc<RecordingState>,
    open: AtomicBool,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        if !self.is_open() {
            return Err(BridgeError::NotConnected);
        }
        self.state.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn close(&mut self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Client wired to a [`RecordingConnector`]
pub fn recording_client() -> (BridgeClient, Arc<RecordingState>) {
    let state = Arc::new(RecordingState::default());
    let client = BridgeClient::new(test_config(), Arc::new(RecordingConnector(state.clone())));
    (client, state)
}

pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        server_id: "test-server".to_string(),
        reconnect_interval: 1,
        ..Default::default()
    }
}

/// Fixed two-player roster with a slow tick, for predictable payloads
pub struct FakeServer {
    pub mspt: f64,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self { mspt: 100.0 }
    }
}

impl StatusSource for FakeServer {
    fn status(&self) -> ServerStatus {
        ServerStatus {
            players: vec![
                PlayerInfo {
                    uuid: "069a79f4-44e9-4726-a5be-fca90e38aaf5".to_string(),
                    name: "Notch".to_string(),
                },
                PlayerInfo {
                    uuid: "853c80ef-3c37-49fd-aa49-938b674adae6".to_string(),
                    name: "jeb_".to_string(),
                },
            ],
            mspt: self.mspt,
        }
    }
}
