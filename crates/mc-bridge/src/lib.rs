//! # mc-bridge
//!
//! Host integration for the Minecraft web bridge.
//!
//! This crate provides:
//! - The main-thread task submission primitive for safe game-state reads
//! - The periodic status reporter (player list + heartbeat)
//! - The [`WebBridge`] service the host drives through [`HostEvents`]

pub mod host;
pub mod reporter;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use host::{HostEvents, MainThread, MainThreadDriver, ServerStatus, StatusSource};
pub use reporter::StatusReporter;
pub use service::WebBridge;
