//! WebSocket handler for live room connections.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{room_id}?user_id=<id>`
//! 2. Server subscribes the connection to the room's broadcasts
//! 3. Server sends a `welcome` message with the match snapshot and the user's seat, both taken
//!    when the subscription was registered
//! 4. A send task forwards broadcasts and direct replies
//! 5. A receive task parses client messages and forwards them to the room actor
//! 6. When either task ends the other is stopped and this connection's subscription is dropped.
//!    The seat is kept, so a player can reconnect and carry on.
//!
//! A connection that falls more than a channel's worth of broadcasts behind is dropped by the
//! room. The server then closes the socket, and reconnecting yields a fresh snapshot.
//!
//! # Client Messages
//!
//! ```json
//! {"type": "join"}
//! {"type": "leave"}
//! {"type": "drop", "column": 3}
//! {"type": "snapshot"}
//! {"type": "rematch"}
//! ```
//!
//! # Server Messages
//!
//! Broadcasts (`outcome`, `seats`, `rematch`, `closed`) reach every connection in the room in
//! the order the room ruled on them. An accepted drop is only ever delivered as a broadcast,
//! including to the player who made it. Everything else (`welcome`, `seated`, `left`,
//! `rejected`, `snapshot`, `error`) answers the requesting connection only.
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws/1?user_id=42');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === "outcome") {
//!     animateDrop(msg.outcome);
//!   }
//! };
//!
//! ws.send(JSON.stringify({ type: "drop", column: 3 }));
//! ```

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use connect_four::{
    net::{
        messages::{ClientMessage, ServerMessage},
        protocol_version::ProtocolVersion,
    },
    room::{RoomError, RoomHandle, RoomId, RoomNotification, RoomResponse, SubscriberId, UserId},
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::sync::mpsc;

use super::{AppState, rate_limiter::MessageLimiter, rooms::record_outcome};
use crate::metrics;

/// Buffered messages per connection. A connection with this many broadcasts unread is dropped.
const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    user_id: Option<String>,
}

impl WsQuery {
    fn user_id(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .filter(|&user_id| user_id > 0)
    }
}

/// Upgrade an HTTP connection to a live room connection.
///
/// # Response
///
/// - `101 Switching Protocols` on success
/// - `401 Unauthorized` if `user_id` is missing or not a positive integer
/// - `404 Not Found` if the room doesn't exist
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<RoomId>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let Some(user_id) = query.user_id() else {
        return (StatusCode::UNAUTHORIZED, "Missing or invalid user_id").into_response();
    };

    let Some(handle) = state.room_manager.get_room(room_id).await else {
        return (StatusCode::NOT_FOUND, "Room not found").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, handle, user_id))
}

/// Handle an established WebSocket connection until either side closes it.
async fn handle_socket(socket: WebSocket, handle: RoomHandle, user_id: UserId) {
    let room_id = handle.room_id();
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket connected: room={}, user={}", room_id, user_id);
    metrics::websocket_connections_total();
    metrics::websocket_connection_opened();

    let (notification_tx, mut notification_rx) =
        mpsc::channel::<RoomNotification>(CHANNEL_CAPACITY);
    let (response_tx, mut response_rx) = mpsc::channel::<ServerMessage>(CHANNEL_CAPACITY);

    let (subscriber_id, welcome) = match welcome(&handle, user_id, notification_tx).await {
        Ok(welcome) => welcome,
        Err(e) => {
            error!("Failed to subscribe to room {}: {}", room_id, e);
            if let Ok(json) = serde_json::to_string(&ServerMessage::error(e.to_string())) {
                let _ = sender.send(Message::Text(json.into())).await;
            }
            metrics::websocket_connection_closed();
            return;
        }
    };

    let mut send_task = tokio::spawn(async move {
        if send_json(&mut sender, &welcome).await.is_err() {
            return;
        }

        loop {
            // Broadcasts first, so one queued before a reply is delivered before it
            let message = tokio::select! {
                biased;
                notification = notification_rx.recv() => match notification {
                    Some(notification) => ServerMessage::from(notification),
                    // The room closed or dropped this connection for lagging
                    None => break,
                },
                Some(response) = response_rx.recv() => response,
            };

            if send_json(&mut sender, &message).await.is_err() {
                return;
            }
        }

        debug!("Room {} ended the stream for user {}", room_id, user_id);
        let _ = sender.send(Message::Close(None)).await;
    });

    let room = handle.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut limiter = MessageLimiter::default();

        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(limit) = limiter.check() {
                        warn!(
                            "{:?} rate limit exceeded for user {} (room {}). Blocking message.",
                            limit, user_id, room_id
                        );
                        let _ = response_tx.send(ServerMessage::error(limit.message())).await;
                        continue;
                    }

                    debug!("Received message from user {}: {}", user_id, text);

                    let response = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => handle_client_message(client_msg, &room, user_id).await,
                        Err(e) => {
                            warn!("Failed to parse client message: {}", e);
                            Some(ServerMessage::error("Invalid message format"))
                        }
                    };

                    if let Some(response) = response
                        && response_tx.send(response).await.is_err()
                    {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket closed: room={}, user={}", room_id, user_id);
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if let Err(e) = handle.unsubscribe(subscriber_id).await {
        debug!("Unsubscribe from room {} failed: {}", room_id, e);
    }

    metrics::websocket_connection_closed();
    info!("WebSocket disconnected: room={}, user={}", room_id, user_id);
}

/// Subscribe to the room and build the first message for the connection.
///
/// Snapshot and seats come back with the subscription itself, so every notification that
/// arrives on `notification_tx` afterwards is a change on top of the snapshot.
async fn welcome(
    handle: &RoomHandle,
    user_id: UserId,
    notification_tx: mpsc::Sender<RoomNotification>,
) -> Result<(SubscriberId, ServerMessage), RoomError> {
    let subscription = handle.subscribe(user_id, notification_tx).await?;

    let welcome = ServerMessage::Welcome {
        protocol: ProtocolVersion::current(),
        room_id: handle.room_id(),
        user_id,
        seat: subscription.seats.seat_of(user_id),
        snapshot: subscription.snapshot,
    };

    Ok((subscription.id, welcome))
}

async fn send_json<S>(sender: &mut S, message: &ServerMessage) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return Ok(());
        }
    };

    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// Forward a client message to the room actor.
///
/// Returns the direct reply for the requesting connection, or `None` when the room's broadcast
/// already carries the answer (accepted drops and rematches).
async fn handle_client_message(
    msg: ClientMessage,
    handle: &RoomHandle,
    user_id: UserId,
) -> Option<ServerMessage> {
    let result = match msg {
        ClientMessage::Join => handle.join(user_id).await.map(|response| match response {
            RoomResponse::Seated { player } => Some(ServerMessage::Seated { player }),
            other => Some(response_error(other)),
        }),

        ClientMessage::Leave => handle.leave(user_id).await.map(|response| match response {
            RoomResponse::Success => Some(ServerMessage::Left),
            other => Some(response_error(other)),
        }),

        ClientMessage::Drop { column } => {
            handle
                .drop_piece(user_id, column)
                .await
                .map(|response| match response {
                    RoomResponse::Outcome(outcome) => {
                        record_outcome(handle.room_id(), &outcome);
                        if outcome.accepted {
                            None
                        } else {
                            Some(ServerMessage::Rejected { outcome })
                        }
                    }
                    other => Some(response_error(other)),
                })
        }

        ClientMessage::Snapshot => handle
            .snapshot()
            .await
            .map(|snapshot| Some(ServerMessage::Snapshot { snapshot })),

        ClientMessage::Rematch => handle.rematch(user_id).await.map(|response| match response {
            RoomResponse::Rematched(_) => None,
            other => Some(response_error(other)),
        }),
    };

    result.unwrap_or_else(|e| Some(ServerMessage::error(e.to_string())))
}

fn response_error(response: RoomResponse) -> ServerMessage {
    ServerMessage::error(
        response
            .error_message()
            .unwrap_or_else(|| "Unexpected response".to_string()),
    )
}
