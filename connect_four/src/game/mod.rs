//! Connect-Four rules engine.
//!
//! - [`board`]: the grid and gravity placement
//! - [`win`]: N-in-a-row detection
//! - [`authority`]: the single writer that validates turns and drops
//! - [`fall`]: cosmetic fall timing handed to presenters

pub mod authority;
pub mod board;
pub mod config;
pub mod entities;
pub mod errors;
pub mod fall;
pub mod win;

pub use authority::{DropOutcome, GameStatus, MatchSnapshot, OutcomeStatus, TurnAuthority, TurnState};
pub use board::{Board, BoardSnapshot};
pub use config::{ConfigError, GameConfig, StartingPlayer};
pub use entities::{Cell, Column, PlayerId, Row};
pub use errors::{DropError, DropResult};
pub use fall::{FallAnimation, FallFrame, FallTiming};
pub use win::{Axis, Position, WinningLine, check_win, find_winning_line};
