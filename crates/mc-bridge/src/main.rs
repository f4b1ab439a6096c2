//! mc-bridge: standalone bridge runner
//!
//! Connects a simulated game server to the configured web endpoint. Useful
//! for soaking the endpoint or exercising the bridge without a real server:
//! the roster is fixed and tick timing is synthetic, everything else is the
//! production path.

use anyhow::Result;
use bridge_core::{BridgeConfig, PlayerInfo};
use mc_bridge::{HostEvents, MainThread, ServerStatus, StatusSource, WebBridge};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

struct SimulatedServer;

impl StatusSource for SimulatedServer {
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
            mspt: 12.5,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().collect();
    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("webbridge.json")
    };

    let config = BridgeConfig::load(&config_path)?;
    if !config.enabled {
        info!("Bridge disabled in config, exiting");
        return Ok(());
    }

    info!(
        "Starting mc-bridge, endpoint: {}, serverId: {}",
        config.websocket.url, config.server_id
    );

    let main_thread = MainThread::start();
    let bridge = WebBridge::new(config, main_thread, Arc::new(SimulatedServer));
    bridge.on_server_started();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    bridge.shutdown().await;

    Ok(())
}
