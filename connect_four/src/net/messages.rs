use serde::{Deserialize, Serialize};

use super::protocol_version::ProtocolVersion;
use crate::{
    game::{Column, DropOutcome, MatchSnapshot, PlayerId},
    room::{RoomId, RoomNotification, Seats, UserId},
};

/// A request from a client. Only ever names a column; legality is the server's call.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a seat in the room
    Join,
    /// Give up the seat
    Leave,
    /// Drop a piece in `column`
    Drop { column: Column },
    /// Ask for the authoritative match state
    Snapshot,
    /// Start a new match after the current one ended
    Rematch,
}

/// A message from the server.
///
/// `Outcome`, `Seats`, `Rematch` and `Closed` are broadcasts and every connection in the room
/// receives the same payload. The rest answer the connection that asked.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message on every connection
    Welcome {
        protocol: ProtocolVersion,
        room_id: RoomId,
        user_id: UserId,
        seat: Option<PlayerId>,
        snapshot: MatchSnapshot,
    },
    /// Answer to `join`
    Seated { player: PlayerId },
    /// Answer to `leave`
    Left,
    /// An accepted drop
    Outcome { outcome: DropOutcome },
    /// A drop the authority turned down. Only the requester sees it.
    Rejected { outcome: DropOutcome },
    Seats { seats: Seats },
    Rematch { snapshot: MatchSnapshot },
    Snapshot { snapshot: MatchSnapshot },
    Closed,
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl From<RoomNotification> for ServerMessage {
    fn from(notification: RoomNotification) -> Self {
        match notification {
            RoomNotification::Outcome(outcome) => Self::Outcome { outcome },
            RoomNotification::SeatsChanged(seats) => Self::Seats { seats },
            RoomNotification::Rematch(snapshot) => Self::Rematch { snapshot },
            RoomNotification::Closed => Self::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, TurnAuthority};

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"drop","column":3}"#).unwrap();
        assert_eq!(msg, ClientMessage::Drop { column: 3 });

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"snapshot"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Snapshot);

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"drop"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"undo"}"#).is_err());
    }

    #[test]
    fn outcome_broadcast_shape() {
        let mut authority = TurnAuthority::with_first_player(GameConfig::default(), PlayerId::PlayerA);
        let outcome = authority.request_drop(PlayerId::PlayerA, 2);

        let msg = ServerMessage::from(RoomNotification::Outcome(outcome));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "outcome");
        assert_eq!(json["outcome"]["accepted"], true);
        assert_eq!(json["outcome"]["landing_row"], 0);
        assert_eq!(json["outcome"]["fall"]["origin_row"], 6);
    }

    #[test]
    fn error_helper() {
        let json = serde_json::to_value(ServerMessage::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "error", "message": "nope"}));
    }
}
