//! Transport abstractions for the bridge client
//!
//! The client owns at most one `Transport` at a time and learns about its
//! death through `ConnectionEvent`s tagged with a session number, so a
//! late close notification from a torn-down connection cannot clobber a
//! newer one.

use async_trait::async_trait;
use bridge_core::Result;
use std::time::Duration;
use tokio::sync::mpsc;

/// Bounded wait applied to every connect attempt
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Who ended the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Remote endpoint closed the session
    Remote,
    /// We closed it ourselves
    Local,
    /// Transport error tore the session down
    Error,
}

/// Lifecycle notification raised by a live transport
#[derive(Debug, Clone, Copy)]
pub enum ConnectionEvent {
    /// The session identified by `session` is gone
    Closed { session: u64, reason: CloseReason },
}

/// One physical socket session
#[async_trait]
pub trait Transport: Send {
    /// Send a single text message; fails if the session is not open
    async fn send(&mut self, text: &str) -> Result<()>;

    /// Close the session locally
    async fn close(&mut self);

    /// Whether the session is still open
    fn is_open(&self) -> bool;
}

/// Factory for transports, the seam mocked out in tests
#[async_trait]
pub trait Connector: Send + Sync {
    /// Dial `url` within `timeout`; lifecycle notifications for the
    /// resulting session are tagged with `session` and delivered on `events`
    async fn connect(
        &self,
        url: &str,
        timeout: Duration,
        session: u64,
        events: mpsc::Sender<ConnectionEvent>,
    ) -> Result<Box<dyn Transport>>;
}
