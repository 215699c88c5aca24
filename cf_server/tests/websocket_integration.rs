//! WebSocket integration tests for live rooms.
//!
//! Runs the real server on an ephemeral port and talks to it with tokio-tungstenite clients.

use cf_server::api::{AppState, create_router};
use connect_four::room::{RoomConfig, RoomManager};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper to start a server with one default room
async fn start_server() -> (SocketAddr, i64) {
    let (addr, _, room_id) = start_server_with_manager().await;
    (addr, room_id)
}

async fn start_server_with_manager() -> (SocketAddr, Arc<RoomManager>, i64) {
    let room_manager = Arc::new(RoomManager::new());
    let room_id = room_manager
        .create_room(RoomConfig::default())
        .await
        .unwrap();

    let app = create_router(AppState {
        room_manager: room_manager.clone(),
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, room_manager, room_id)
}

/// Wait until the room reports `count` live subscriptions
async fn wait_for_subscribers(manager: &RoomManager, room_id: i64, count: usize) {
    timeout(Duration::from_secs(5), async {
        while manager.get_room_state(room_id).await.unwrap().subscriber_count != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count never settled");
}

async fn connect(addr: SocketAddr, room_id: i64, user_id: i64) -> WsStream {
    let url = format!("ws://{addr}/ws/{room_id}?user_id={user_id}");
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

async fn recv_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("connection closed")
            .unwrap();

        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Skip ahead to the next message of the given type
async fn recv_type(ws: &mut WsStream, kind: &str) -> Value {
    loop {
        let msg = recv_json(ws).await;
        if msg["type"] == kind {
            return msg;
        }
    }
}

#[tokio::test]
async fn test_websocket_connection_without_user_fails() {
    let (addr, room_id) = start_server().await;

    let result = connect_async(format!("ws://{addr}/ws/{room_id}")).await;
    assert!(result.is_err(), "Should reject connection without user_id");

    let result = connect_async(format!("ws://{addr}/ws/{room_id}?user_id=-4")).await;
    assert!(result.is_err(), "Should reject a non-positive user_id");
}

#[tokio::test]
async fn test_websocket_unknown_room_fails() {
    let (addr, _) = start_server().await;

    let result = connect_async(format!("ws://{addr}/ws/404?user_id=1")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_websocket_welcome() {
    let (addr, room_id) = start_server().await;
    let mut ws = connect(addr, room_id, 1).await;

    let welcome = recv_json(&mut ws).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["protocol"], "v2");
    assert_eq!(welcome["room_id"], room_id);
    assert_eq!(welcome["user_id"], 1);
    assert_eq!(welcome["seat"], Value::Null);
    assert_eq!(welcome["snapshot"]["moves_played"], 0);
    assert_eq!(welcome["snapshot"]["board"]["columns"], 7);
}

#[tokio::test]
async fn test_websocket_invalid_message() {
    let (addr, room_id) = start_server().await;
    let mut ws = connect(addr, room_id, 1).await;
    recv_type(&mut ws, "welcome").await;

    send_json(&mut ws, json!({"type": "drop"})).await;
    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Invalid message format");
}

#[tokio::test]
async fn test_outcomes_are_broadcast_and_rejections_are_private() {
    let (addr, room_id) = start_server().await;
    let mut alice = connect(addr, room_id, 1).await;
    let mut bob = connect(addr, room_id, 2).await;
    recv_type(&mut alice, "welcome").await;
    recv_type(&mut bob, "welcome").await;

    send_json(&mut alice, json!({"type": "join"})).await;
    let seated = recv_type(&mut alice, "seated").await;
    assert_eq!(seated["player"], "player_a");

    send_json(&mut bob, json!({"type": "join"})).await;
    let seated = recv_type(&mut bob, "seated").await;
    assert_eq!(seated["player"], "player_b");

    // Drain the seat broadcasts
    send_json(&mut alice, json!({"type": "snapshot"})).await;
    recv_type(&mut alice, "snapshot").await;

    send_json(&mut alice, json!({"type": "drop", "column": 3})).await;
    let for_alice = recv_json(&mut alice).await;
    let for_bob = recv_json(&mut bob).await;

    assert_eq!(for_alice["type"], "outcome");
    assert_eq!(for_alice, for_bob);
    assert_eq!(for_alice["outcome"]["accepted"], true);
    assert_eq!(for_alice["outcome"]["landing_row"], 0);
    assert_eq!(for_alice["outcome"]["fall"]["origin_row"], 6);

    // Alice moves out of turn; only she hears about it
    send_json(&mut alice, json!({"type": "drop", "column": 3})).await;
    let rejected = recv_json(&mut alice).await;
    assert_eq!(rejected["type"], "rejected");
    assert_eq!(rejected["outcome"]["rejection"]["kind"], "not_your_turn");

    send_json(&mut bob, json!({"type": "snapshot"})).await;
    let snapshot = recv_json(&mut bob).await;
    assert_eq!(snapshot["type"], "snapshot");
    assert_eq!(snapshot["snapshot"]["moves_played"], 1);
}

#[tokio::test]
async fn test_spectator_receives_outcomes() {
    let (addr, room_id) = start_server().await;
    let mut alice = connect(addr, room_id, 1).await;
    let mut viewer = connect(addr, room_id, 3).await;
    recv_type(&mut alice, "welcome").await;
    recv_type(&mut viewer, "welcome").await;

    send_json(&mut alice, json!({"type": "join"})).await;
    recv_type(&mut alice, "seated").await;

    let seats = recv_type(&mut viewer, "seats").await;
    assert_eq!(seats["seats"]["player_a"], 1);

    send_json(&mut viewer, json!({"type": "drop", "column": 0})).await;
    let reply = recv_json(&mut viewer).await;
    assert_eq!(reply["type"], "error");

    send_json(&mut alice, json!({"type": "drop", "column": 0})).await;
    let outcome = recv_type(&mut viewer, "outcome").await;
    assert_eq!(outcome["outcome"]["player"], "player_a");
}

#[tokio::test]
async fn test_reconnected_player_still_receives_outcomes() {
    let (addr, manager, room_id) = start_server_with_manager().await;
    let mut alice = connect(addr, room_id, 1).await;
    let mut bob = connect(addr, room_id, 2).await;
    recv_type(&mut alice, "welcome").await;
    recv_type(&mut bob, "welcome").await;

    send_json(&mut alice, json!({"type": "join"})).await;
    recv_type(&mut alice, "seated").await;
    send_json(&mut bob, json!({"type": "join"})).await;
    recv_type(&mut bob, "seated").await;

    // Alice opens a second connection, then the first one goes away
    let mut again = connect(addr, room_id, 1).await;
    let welcome = recv_type(&mut again, "welcome").await;
    assert_eq!(welcome["seat"], "player_a");
    wait_for_subscribers(&manager, room_id, 3).await;

    alice.close(None).await.unwrap();
    wait_for_subscribers(&manager, room_id, 2).await;

    send_json(&mut again, json!({"type": "drop", "column": 0})).await;
    let outcome = recv_type(&mut again, "outcome").await;
    assert_eq!(outcome["outcome"]["accepted"], true);
    assert_eq!(outcome["outcome"]["player"], "player_a");

    let for_bob = recv_type(&mut bob, "outcome").await;
    assert_eq!(for_bob, outcome);
}

#[tokio::test]
async fn test_room_close_ends_the_connection() {
    let (addr, manager, room_id) = start_server_with_manager().await;
    let mut ws = connect(addr, room_id, 1).await;
    recv_type(&mut ws, "welcome").await;

    manager.close_room(room_id).await.unwrap();
    recv_type(&mut ws, "closed").await;

    let end = timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(end.is_ok(), "server should close the socket once the room stops");
}
