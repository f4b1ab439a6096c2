//! # bridge-client
//!
//! Resilient streaming client for the Minecraft web bridge.
//!
//! This crate provides:
//! - Transport abstractions (Transport/Connector traits) and the WebSocket
//!   implementation on tokio-tungstenite
//! - The outbound message queue with batched FIFO flush
//! - The reconnection policy (attempt ceiling, fixed retry delay)
//! - The bridge client tying those together under one run/stop lifecycle

pub mod client;
pub mod queue;
pub mod reconnect;
pub mod transport;
pub mod ws;

pub use client::BridgeClient;
pub use queue::{OutboundQueue, QUEUE_WARN_DEPTH};
pub use reconnect::{ReconnectDecision, ReconnectPolicy, RetryState};
pub use transport::{CONNECT_TIMEOUT, CloseReason, ConnectionEvent, Connector, Transport};
pub use ws::WsConnector;
