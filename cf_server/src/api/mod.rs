//! HTTP/WebSocket API for the Connect Four server.
//!
//! Rooms are owned by actor tasks behind [`RoomManager`]; every handler here forwards a request
//! to the room's actor and renders the reply. The actor is the only writer of a room's match,
//! so simultaneous requests from REST and WebSocket clients are ruled on one at a time.
//!
//! # Modules
//!
//! - [`rooms`]: Room management and seat-bound actions (join, leave, drop, rematch)
//! - [`websocket`]: Live connection per room with broadcast outcomes
//! - [`session`]: Session middleware for seat-bound endpoints
//! - [`request_id`]: Request correlation IDs
//! - [`rate_limiter`]: Per-connection WebSocket message limits
//!
//! # Endpoints Overview
//!
//! ## Rooms (public)
//! - `GET /api/v1/rooms` - List rooms
//! - `POST /api/v1/rooms` - Create a room
//! - `GET /api/v1/rooms/{id}` - Room summary
//! - `GET /api/v1/rooms/{id}/board` - Match snapshot
//!
//! ## Seats (session required)
//! - `POST /api/v1/rooms/{id}/join` - Take a seat
//! - `POST /api/v1/rooms/{id}/leave` - Give up a seat
//! - `POST /api/v1/rooms/{id}/drop` - Request a drop
//! - `POST /api/v1/rooms/{id}/rematch` - Start a new match
//!
//! ## WebSocket
//! - `GET /ws/{room_id}?user_id=<id>` - Live room connection
//!
//! ## Health Check
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cf_server::api::{create_router, AppState};
//! use connect_four::room::RoomManager;
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState {
//!     room_manager: Arc::new(RoomManager::new()),
//! };
//!
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod rate_limiter;
pub mod request_id;
pub mod rooms;
pub mod session;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use connect_four::room::RoomManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; the manager sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub room_manager: Arc<RoomManager>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                         - Health check (public)
/// GET  /api/v1/rooms                   - List rooms (public)
/// POST /api/v1/rooms                   - Create room (public)
/// GET  /api/v1/rooms/{id}              - Room summary (public)
/// GET  /api/v1/rooms/{id}/board        - Match snapshot (public)
/// POST /api/v1/rooms/{id}/join         - Take a seat (session required)
/// POST /api/v1/rooms/{id}/leave        - Give up a seat (session required)
/// POST /api/v1/rooms/{id}/drop         - Drop a piece (session required)
/// POST /api/v1/rooms/{id}/rematch      - New match (session required)
/// GET  /ws/{room_id}?user_id=<id>      - WebSocket
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router();

    // Root routes (health check, WebSocket - not versioned)
    let root_routes = Router::new()
        .route("/health", get(health_check))
        // WebSocket route reads the user from its query string
        .route("/ws/{room_id}", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    let public_routes = Router::new()
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route("/rooms/{room_id}", get(rooms::get_room))
        .route("/rooms/{room_id}/board", get(rooms::get_board));

    let seated_routes = Router::new()
        .route("/rooms/{room_id}/join", post(rooms::join_room))
        .route("/rooms/{room_id}/leave", post(rooms::leave_room))
        .route("/rooms/{room_id}/drop", post(rooms::drop_piece))
        .route("/rooms/{room_id}/rematch", post(rooms::rematch))
        .layer(axum::middleware::from_fn(session::session_middleware));

    Router::new().merge(public_routes).merge(seated_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","rooms":{"active_count":1},"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let room_count = state.room_manager.active_room_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": {
            "active_count": room_count
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
