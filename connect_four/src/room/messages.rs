//! Room actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use super::{RoomId, UserId};
use crate::game::{Column, DropOutcome, GameStatus, MatchSnapshot, PlayerId};

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Take a free seat, or get back the seat already held
    Join {
        user_id: UserId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Give up a seat
    Leave {
        user_id: UserId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Drop a piece on behalf of the user's seat
    Drop {
        user_id: UserId,
        column: Column,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Start a fresh match once the current one is over
    Rematch {
        user_id: UserId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Authoritative match view for resyncing
    GetSnapshot {
        response: oneshot::Sender<MatchSnapshot>,
    },

    /// Room summary
    GetState {
        response: oneshot::Sender<RoomStateResponse>,
    },

    /// Register a connection for broadcasts. Every call gets its own subscription, so one user
    /// may hold several at once.
    Subscribe {
        user_id: UserId,
        sender: mpsc::Sender<RoomNotification>,
        response: oneshot::Sender<Subscription>,
    },

    Unsubscribe { subscriber_id: SubscriberId },

    /// Stop the actor
    Close {
        response: oneshot::Sender<RoomResponse>,
    },
}

/// Identifies one subscription, unique within its room.
pub type SubscriberId = u64;

/// Reply to `Subscribe`.
///
/// The snapshot and seats are taken in the same step that registers the sender, so the first
/// notification the subscriber receives is the first change after `snapshot`.
#[derive(Clone, Debug, PartialEq)]
pub struct Subscription {
    pub id: SubscriberId,
    pub snapshot: MatchSnapshot,
    pub seats: Seats,
}

/// Broadcast to every subscriber, identical for all of them
#[derive(Clone, Debug, PartialEq)]
pub enum RoomNotification {
    /// An accepted drop
    Outcome(DropOutcome),
    /// Someone took or gave up a seat
    SeatsChanged(Seats),
    /// A new match started on a fresh board
    Rematch(MatchSnapshot),
    /// The room is shutting down
    Closed,
}

/// Seat assignments. `None` means the seat is free.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seats {
    pub player_a: Option<UserId>,
    pub player_b: Option<UserId>,
}

impl Seats {
    /// Seat currently held by `user_id`.
    pub fn seat_of(&self, user_id: UserId) -> Option<PlayerId> {
        PlayerId::ALL
            .into_iter()
            .find(|&player| self.occupant(player) == Some(user_id))
    }

    pub fn occupant(&self, player: PlayerId) -> Option<UserId> {
        match player {
            PlayerId::PlayerA => self.player_a,
            PlayerId::PlayerB => self.player_b,
        }
    }

    /// Seat `user_id` in the first free seat, A before B.
    pub fn assign(&mut self, user_id: UserId) -> Option<PlayerId> {
        let player = PlayerId::ALL
            .into_iter()
            .find(|&player| self.occupant(player).is_none())?;
        *self.slot(player) = Some(user_id);
        Some(player)
    }

    /// Free whatever seat `user_id` holds.
    pub fn release(&mut self, user_id: UserId) -> Option<PlayerId> {
        let player = self.seat_of(user_id)?;
        *self.slot(player) = None;
        Some(player)
    }

    pub fn count(&self) -> usize {
        usize::from(self.player_a.is_some()) + usize::from(self.player_b.is_some())
    }

    fn slot(&mut self, player: PlayerId) -> &mut Option<UserId> {
        match player {
            PlayerId::PlayerA => &mut self.player_a,
            PlayerId::PlayerB => &mut self.player_b,
        }
    }
}

/// Response from room operations
#[derive(Clone, Debug, PartialEq)]
pub enum RoomResponse {
    /// Operation succeeded
    Success,

    /// Join succeeded; the user plays this seat
    Seated { player: PlayerId },

    /// The authority's ruling on a drop, accepted or not
    Outcome(DropOutcome),

    /// A new match started; this is the board that was broadcast with it
    Rematched(MatchSnapshot),

    /// Both seats are taken
    RoomFull,

    /// The user holds no seat in this room
    NotSeated,

    /// Operation failed
    Error(String),
}

impl RoomResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        match self {
            RoomResponse::Success | RoomResponse::Seated { .. } | RoomResponse::Rematched(_) => {
                true
            }
            RoomResponse::Outcome(outcome) => outcome.accepted,
            _ => false,
        }
    }

    /// Get error message if response is error
    pub fn error_message(&self) -> Option<String> {
        match self {
            RoomResponse::Error(msg) => Some(msg.clone()),
            RoomResponse::RoomFull => Some("Room is full".to_string()),
            RoomResponse::NotSeated => Some("Not seated in this room".to_string()),
            RoomResponse::Outcome(outcome) => outcome.rejection.as_ref().map(ToString::to_string),
            _ => None,
        }
    }
}

/// Room state response
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomStateResponse {
    pub room_id: RoomId,
    pub room_name: String,
    pub seats: Seats,
    pub subscriber_count: usize,
    pub status: GameStatus,
    pub current_player: PlayerId,
    pub moves_played: usize,
    /// Completed matches, not counting the one in progress
    pub matches_played: usize,
    pub rows: usize,
    pub columns: usize,
    pub pieces_to_win: usize,
    pub allow_diagonal: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_fill_a_then_b() {
        let mut seats = Seats::default();
        assert_eq!(seats.assign(7), Some(PlayerId::PlayerA));
        assert_eq!(seats.assign(8), Some(PlayerId::PlayerB));
        assert_eq!(seats.assign(9), None);
        assert_eq!(seats.count(), 2);
        assert_eq!(seats.seat_of(8), Some(PlayerId::PlayerB));
    }

    #[test]
    fn released_seat_is_reused() {
        let mut seats = Seats::default();
        seats.assign(7);
        seats.assign(8);
        assert_eq!(seats.release(7), Some(PlayerId::PlayerA));
        assert_eq!(seats.release(7), None);
        assert_eq!(seats.assign(9), Some(PlayerId::PlayerA));
    }

    #[test]
    fn response_messages() {
        assert!(RoomResponse::Success.is_success());
        assert!(!RoomResponse::RoomFull.is_success());
        assert_eq!(
            RoomResponse::NotSeated.error_message(),
            Some("Not seated in this room".to_string())
        );
        assert_eq!(RoomResponse::Success.error_message(), None);
    }
}
