//! # bridge-core
//!
//! Core types for the Minecraft web bridge.
//!
//! This crate provides the foundational pieces shared by the client and the
//! host integration:
//! - Bridge configuration and connection URL building
//! - Error taxonomy
//! - Outbound wire messages (player list, heartbeat) and inbound parsing
//! - Tick performance (TPS/MSPT) derivation

pub mod config;
pub mod error;
pub mod message;

pub use config::{BridgeConfig, WebSocketEndpoint, check_ws_scheme};
pub use error::{BridgeError, Result};
pub use message::{
    InboundMessage, PlayerInfo, epoch_millis, heartbeat_message, parse_inbound,
    player_list_message, tick_performance,
};
