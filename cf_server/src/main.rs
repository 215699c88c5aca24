//! Connect Four room server.
//!
//! Spawns one RoomActor per room, managed by RoomManager, and serves the REST and WebSocket
//! API on a single listener.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Error;
use cf_server::{api, config::ServerConfig, logging, metrics};
use connect_four::room::{RoomConfig, RoomManager};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a Connect Four room server

USAGE:
  cf_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --rooms      N           Number of rooms to create   [default: env MAX_ROOMS or 1]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus exporter address; metrics are off when unset
  BOARD_ROWS               Rows per board, 3-8          [default: 6]
  BOARD_COLUMNS            Columns per board, 3-8       [default: 7]
  PIECES_TO_WIN            Pieces in a line to win      [default: 4]
  ALLOW_DIAGONAL           Count diagonal lines         [default: true]
  STARTING_PLAYER          player_a, player_b or random [default: player_a]
  DROP_SPEED               Fall speed in rows/second    [default: 4]
  RUST_LOG                 Log filter                   [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let num_rooms: Option<usize> = pargs.opt_value_from_str("--rooms")?;

    logging::init();

    let config = ServerConfig::from_env(bind, num_rooms)?;
    config.validate()?;

    info!("Starting Connect Four server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exported on {}", metrics_bind);
    }

    let room_manager = Arc::new(RoomManager::new());

    info!("Creating {} initial room(s)...", config.num_rooms);

    for i in 0..config.num_rooms {
        let room_config = RoomConfig::new(format!("Room {}", i + 1), config.game.clone());

        match room_manager.create_room(room_config).await {
            Ok(room_id) => {
                info!("Created room {} with ID {}", i + 1, room_id);
            }
            Err(e) => {
                log::error!("Failed to create room {}: {}", i + 1, e);
            }
        }
    }

    let active_count = room_manager.active_room_count().await;
    metrics::active_rooms(active_count);
    info!("Server ready with {} active room(s)", active_count);

    for room in room_manager.list_rooms().await {
        info!(
            "  - {} (ID: {}) - {}x{}, {} to win, diagonals {}",
            room.name,
            room.id,
            room.rows,
            room.columns,
            room.pieces_to_win,
            if room.allow_diagonal { "on" } else { "off" }
        );
    }

    let app = api::create_router(api::AppState { room_manager });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for CTRL+C: {}", e);
        // Without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
}
