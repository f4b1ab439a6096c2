//! Wire message construction and parsing
//!
//! Outbound messages share one envelope: `{type, source: "mc", timestamp,
//! data}`. The client treats payloads as opaque strings; everything here is
//! built up front by the reporter.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source tag carried by every outbound message
pub const SOURCE: &str = "mc";

/// A single online player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub uuid: String,
    pub name: String,
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    source: &'static str,
    timestamp: u64,
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerListData {
    event: &'static str,
    id: String,
    server_id: String,
    online: usize,
    players: Vec<PlayerInfo>,
    tps: f64,
    mspt: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeartbeatData {
    server_id: String,
}

/// Derive (tps, mspt) from a raw average milliseconds-per-tick reading
///
/// TPS is clamped to the 20.0 ceiling: `min(20, 1000 / max(mspt, 50))`.
/// Both values are rounded to two decimals for the wire.
pub fn tick_performance(raw_mspt: f64) -> (f64, f64) {
    let tps = (1000.0 / raw_mspt.max(50.0)).min(20.0);
    (round2(tps), round2(raw_mspt))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Current time as epoch milliseconds
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Build a PLAYER_LIST event message
pub fn player_list_message(
    server_id: &str,
    players: Vec<PlayerInfo>,
    raw_mspt: f64,
    timestamp: u64,
) -> Result<String> {
    let (tps, mspt) = tick_performance(raw_mspt);

    let envelope = Envelope {
        kind: "event",
        source: SOURCE,
        timestamp,
        data: PlayerListData {
            event: "PLAYER_LIST",
            id: format!("pl-{}", timestamp),
            server_id: server_id.to_string(),
            online: players.len(),
            players,
            tps,
            mspt,
        },
    };

    Ok(serde_json::to_string(&envelope)?)
}

/// Build a minimal liveness heartbeat message
pub fn heartbeat_message(server_id: &str, timestamp: u64) -> Result<String> {
    let envelope = Envelope {
        kind: "heartbeat",
        source: SOURCE,
        timestamp,
        data: HeartbeatData {
            server_id: server_id.to_string(),
        },
    };

    Ok(serde_json::to_string(&envelope)?)
}

/// Inbound message from the remote endpoint
///
/// Only `system` messages matter to the bridge itself; anything else is
/// ignored. Unknown fields are tolerated.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parse an inbound text frame
pub fn parse_inbound(text: &str) -> Result<InboundMessage> {
    Ok(serde_json::from_str(text)?)
}
