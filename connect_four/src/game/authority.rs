//! Server-side turn authority.
//!
//! [`TurnAuthority`] exclusively owns the board and turn state of one match and is the only
//! thing allowed to mutate them. Requests are validated in a fixed order (terminal state,
//! turn, column range, column space) so the reported rejection is deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    board::{Board, BoardSnapshot},
    config::GameConfig,
    entities::{Column, PlayerId, Row},
    errors::{DropError, DropResult},
    fall::FallTiming,
    win::{self, WinningLine},
};

/// Lifecycle of a match. `Won` and `Draw` are terminal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "state", content = "player", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won(PlayerId),
    Draw,
}

impl GameStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "in progress"),
            Self::Won(player) => write!(f, "won by {player}"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// Whose turn it is and where the match stands.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TurnState {
    pub current_player: PlayerId,
    pub status: GameStatus,
}

/// Match status as reported to participants after a drop.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Continue { next_player: PlayerId },
    Won { player: PlayerId },
    Draw,
}

impl From<TurnState> for OutcomeStatus {
    fn from(turn: TurnState) -> Self {
        match turn.status {
            GameStatus::InProgress => Self::Continue {
                next_player: turn.current_player,
            },
            GameStatus::Won(player) => Self::Won { player },
            GameStatus::Draw => Self::Draw,
        }
    }
}

/// Result of a single drop request.
///
/// Rejections are ordinary values, never panics or errors crossing the authority boundary:
/// callers branch on `accepted`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DropOutcome {
    pub accepted: bool,
    /// Who asked.
    pub player: PlayerId,
    pub column: Column,
    pub landing_row: Option<Row>,
    pub status: OutcomeStatus,
    pub rejection: Option<DropError>,
    pub winning_line: Option<WinningLine>,
    pub fall: Option<FallTiming>,
}

impl DropOutcome {
    fn rejected(player: PlayerId, column: Column, error: DropError, turn: TurnState) -> Self {
        Self {
            accepted: false,
            player,
            column,
            landing_row: None,
            status: turn.into(),
            rejection: Some(error),
            winning_line: None,
            fall: None,
        }
    }

    /// True when this drop ended the match.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.accepted && !matches!(self.status, OutcomeStatus::Continue { .. })
    }
}

/// Full authoritative view of a match, for resyncing observers.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchSnapshot {
    pub board: BoardSnapshot,
    pub turn: TurnState,
    pub moves_played: usize,
    pub pieces_to_win: usize,
    pub allow_diagonal: bool,
    pub winning_line: Option<WinningLine>,
}

/// Single owner of a match's board and turn state.
#[derive(Clone, Debug)]
pub struct TurnAuthority {
    config: GameConfig,
    board: Board,
    turn: TurnState,
    moves_played: usize,
    winning_line: Option<WinningLine>,
}

impl TurnAuthority {
    /// Start a match. The config is normalized here and never changes afterward.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let config = config.normalized();
        let first = config.starting_player.resolve();
        Self::with_first_player(config, first)
    }

    #[must_use]
    pub fn with_first_player(config: GameConfig, first: PlayerId) -> Self {
        let config = config.normalized();
        Self {
            board: Board::new(&config),
            config,
            turn: TurnState {
                current_player: first,
                status: GameStatus::InProgress,
            },
            moves_played: 0,
            winning_line: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.turn.status
    }

    pub fn current_player(&self) -> PlayerId {
        self.turn.current_player
    }

    pub fn is_terminal(&self) -> bool {
        self.turn.status.is_terminal()
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    pub fn winning_line(&self) -> Option<&WinningLine> {
        self.winning_line.as_ref()
    }

    /// Immutable copy of the cell grid.
    #[must_use]
    pub fn board_snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            board: self.board.snapshot(),
            turn: self.turn,
            moves_played: self.moves_played,
            pieces_to_win: self.config.pieces_to_win,
            allow_diagonal: self.config.allow_diagonal,
            winning_line: self.winning_line.clone(),
        }
    }

    /// The only mutating entry point. Always answers with an outcome; rejected requests
    /// leave the board and turn state untouched.
    pub fn request_drop(&mut self, player: PlayerId, column: Column) -> DropOutcome {
        match self.try_drop(player, column) {
            Ok(outcome) => outcome,
            Err(error) => {
                log::debug!("Rejected drop by {player} in column {column}: {error}");
                DropOutcome::rejected(player, column, error, self.turn)
            }
        }
    }

    /// Validate and apply a drop, returning the accepted outcome.
    pub fn try_drop(&mut self, player: PlayerId, column: Column) -> DropResult<DropOutcome> {
        if self.is_terminal() {
            return Err(DropError::GameAlreadyOver);
        }

        if player != self.turn.current_player {
            return Err(DropError::NotYourTurn {
                current: self.turn.current_player,
            });
        }

        // Range and capacity are both checked before the board is touched
        if self.board.lowest_free_row(column)?.is_none() {
            return Err(DropError::ColumnFull { column });
        }

        let landing_row = self.board.place(column, player)?;
        self.moves_played += 1;

        // Win first, then draw: a move that wins and fills the board is a win
        if let Some(line) = win::find_winning_line(&self.board, &self.config) {
            log::info!("{} wins after {} moves", line.owner, self.moves_played);
            self.turn.status = GameStatus::Won(line.owner);
            self.winning_line = Some(line);
        } else if self.board.is_full() {
            log::info!("Board full after {} moves, draw", self.moves_played);
            self.turn.status = GameStatus::Draw;
        } else {
            self.turn.current_player = player.other();
        }

        log::debug!(
            "{player} dropped in column {column}, landed on row {landing_row}, status {}",
            self.turn.status
        );

        Ok(DropOutcome {
            accepted: true,
            player,
            column,
            landing_row: Some(landing_row),
            status: self.turn.into(),
            rejection: None,
            winning_line: self.winning_line.clone(),
            fall: Some(FallTiming::new(
                self.config.rows,
                landing_row,
                self.config.drop_speed,
            )),
        })
    }
}
