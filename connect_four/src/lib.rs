//! # Connect Four
//!
//! A server-authoritative Connect-Four engine: gravity board, N-in-a-row detection, and a
//! turn authority that is the only thing allowed to change a match.
//!
//! ## Architecture
//!
//! A drop travels through three layers:
//!
//! - **Client**: names a column and nothing else
//! - **Room**: an async actor that binds users to seats and serializes every request
//! - **Authority**: validates the request, places the piece, checks for a win, then for a draw
//!
//! Accepted outcomes are broadcast unchanged to everyone in the room, together with the
//! timing a renderer needs to animate the fall.
//!
//! ## Core Modules
//!
//! - [`game`]: board, win detection, turn authority, fall timing
//! - [`room`]: room actors and the room manager
//! - [`net`]: JSON wire messages
//!
//! ## Example
//!
//! ```
//! use connect_four::{GameConfig, OutcomeStatus, PlayerId, TurnAuthority};
//!
//! let mut authority = TurnAuthority::with_first_player(GameConfig::default(), PlayerId::PlayerA);
//! let outcome = authority.request_drop(PlayerId::PlayerA, 3);
//!
//! assert!(outcome.accepted);
//! assert_eq!(outcome.landing_row, Some(0));
//! assert_eq!(outcome.status, OutcomeStatus::Continue { next_player: PlayerId::PlayerB });
//! ```

/// Rules engine: board, win detection, and the turn authority.
pub mod game;
pub use game::{
    Board, BoardSnapshot, Cell, DropError, DropOutcome, GameConfig, GameStatus, MatchSnapshot,
    OutcomeStatus, PlayerId, TurnAuthority, WinningLine,
};

/// JSON wire protocol.
pub mod net;
pub use net::messages::{ClientMessage, ServerMessage};

/// One actor per match, plus discovery.
pub mod room;
pub use room::{RoomConfig, RoomHandle, RoomManager};
