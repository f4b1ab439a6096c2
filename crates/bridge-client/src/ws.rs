//! WebSocket transport using tokio-tungstenite
//!
//! The writer half lives inside [`WsTransport`]; the reader half is drained
//! by a background task that handles inbound frames and reports the close
//! reason when the stream ends.

use crate::transport::{CloseReason, ConnectionEvent, Connector, Transport};
use async_trait::async_trait;
use bridge_core::{BridgeError, Result, check_ws_scheme, parse_inbound};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connector dialing real WebSocket endpoints
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        url: &str,
        timeout: Duration,
        session: u64,
        events: mpsc::Sender<ConnectionEvent>,
    ) -> Result<Box<dyn Transport>> {
        // Configuration error, surfaced before any network attempt
        check_ws_scheme(url)?;

        let (stream, _response) = tokio::time::timeout(timeout, connect_async(url))
            .await
            .map_err(|_| {
                BridgeError::Connect(format!("timed out after {}s", timeout.as_secs()))
            })?
            .map_err(|e| BridgeError::Connect(e.to_string()))?;

        let (write, read) = stream.split();
        let open = Arc::new(AtomicBool::new(true));
        let local_close = Arc::new(AtomicBool::new(false));

        tokio::spawn(reader_task(
            read,
            session,
            events,
            open.clone(),
            local_close.clone(),
        ));

        Ok(Box::new(WsTransport {
            write,
            open,
            local_close,
        }))
    }
}

/// Writer half of an open WebSocket session
pub struct WsTransport {
    write: SplitSink<WsStream, Message>,
    open: Arc<AtomicBool>,
    local_close: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        if !self.is_open() {
            return Err(BridgeError::NotConnected);
        }

        match self.write.send(Message::Text(text.to_string())).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.open.store(false, Ordering::SeqCst);
                Err(BridgeError::Send(e.to_string()))
            }
        }
    }

    async fn close(&mut self) {
        self.local_close.store(true, Ordering::SeqCst);
        let _ = self.write.send(Message::Close(None)).await;
        let _ = self.write.close().await;
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Drain inbound frames until the session dies, then report why
async fn reader_task(
    mut read: SplitStream<WsStream>,
    session: u64,
    events: mpsc::Sender<ConnectionEvent>,
    open: Arc<AtomicBool>,
    local_close: Arc<AtomicBool>,
) {
    let mut reason = CloseReason::Remote;

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_inbound(&text),
            Ok(Message::Close(_)) => {
                if local_close.load(Ordering::SeqCst) {
                    reason = CloseReason::Local;
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if local_close.load(Ordering::SeqCst) {
                    reason = CloseReason::Local;
                } else {
                    tracing::error!("WebSocket error: {}", e);
                    reason = CloseReason::Error;
                }
                break;
            }
        }
    }

    if local_close.load(Ordering::SeqCst) {
        reason = CloseReason::Local;
    }

    open.store(false, Ordering::SeqCst);
    let _ = events.send(ConnectionEvent::Closed { session, reason }).await;
}

/// Inbound messages: only `system` matters to the bridge itself
fn handle_inbound(text: &str) {
    match parse_inbound(text) {
        Ok(msg) if msg.kind == "system" => {
            tracing::info!("System: {}", msg.message.unwrap_or_default());
        }
        Ok(msg) => {
            tracing::debug!("Ignoring inbound message of type {}", msg.kind);
        }
        Err(e) => {
            tracing::warn!("Message parse error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_websocket_scheme() {
        let (events, _rx) = mpsc::channel(4);
        let result = WsConnector
            .connect("http://localhost:4001/mc", Duration::from_secs(5), 1, events)
            .await;

        match result {
            Err(BridgeError::Config(msg)) => assert!(msg.contains("http")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_handle_inbound_tolerates_garbage() {
        // must not panic; errors are logged and dropped
        handle_inbound("not json at all");
        handle_inbound(r#"{"type": "system", "message": "hello"}"#);
        handle_inbound(r#"{"type": "chat"}"#);
    }
}
