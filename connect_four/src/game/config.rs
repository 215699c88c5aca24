//! Per-match game parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::PlayerId;

pub const MIN_DIMENSION: usize = 3;
pub const MAX_DIMENSION: usize = 8;
pub const MIN_PIECES_TO_WIN: usize = 2;

pub const DEFAULT_ROWS: usize = 6;
pub const DEFAULT_COLUMNS: usize = 7;
pub const DEFAULT_PIECES_TO_WIN: usize = 4;
pub const DEFAULT_DROP_SPEED: f32 = 4.0;

/// Errors reported by strict configuration validation
#[derive(Clone, Debug, Deserialize, Error, PartialEq, Serialize)]
pub enum ConfigError {
    #[error("rows must be between 3 and 8, got {0}")]
    RowsOutOfRange(usize),
    #[error("columns must be between 3 and 8, got {0}")]
    ColumnsOutOfRange(usize),
    #[error("pieces to win must be between 2 and {max}, got {value}")]
    PiecesToWinOutOfRange { value: usize, max: usize },
    #[error("drop speed must be a positive number, got {0}")]
    InvalidDropSpeed(f32),
}

/// Who moves first in a new match.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingPlayer {
    #[default]
    PlayerA,
    PlayerB,
    Random,
}

impl StartingPlayer {
    /// Resolve to a concrete player, rolling for `Random`.
    pub fn resolve(self) -> PlayerId {
        match self {
            Self::PlayerA => PlayerId::PlayerA,
            Self::PlayerB => PlayerId::PlayerB,
            Self::Random => {
                if rand::random::<bool>() {
                    PlayerId::PlayerA
                } else {
                    PlayerId::PlayerB
                }
            }
        }
    }
}

impl std::str::FromStr for StartingPlayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" | "player_a" => Ok(Self::PlayerA),
            "b" | "player_b" => Ok(Self::PlayerB),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown starting player '{other}'")),
        }
    }
}

/// Immutable per-match parameters.
///
/// Built once at match creation. [`GameConfig::normalized`] clamps out-of-range values the
/// way a lenient match host does; [`GameConfig::validate`] reports them instead.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub pieces_to_win: usize,
    pub allow_diagonal: bool,
    /// Fall speed factor handed to presenters for the drop animation.
    pub drop_speed: f32,
    pub starting_player: StartingPlayer,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            pieces_to_win: DEFAULT_PIECES_TO_WIN,
            allow_diagonal: true,
            drop_speed: DEFAULT_DROP_SPEED,
            starting_player: StartingPlayer::PlayerA,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn new(rows: usize, columns: usize, pieces_to_win: usize, allow_diagonal: bool) -> Self {
        Self {
            rows,
            columns,
            pieces_to_win,
            allow_diagonal,
            ..Self::default()
        }
        .normalized()
    }

    /// Longest line that fits on the board.
    #[must_use]
    pub fn max_line(&self) -> usize {
        self.rows.max(self.columns)
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Clamp every field into its legal range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let rows = self.rows.clamp(MIN_DIMENSION, MAX_DIMENSION);
        if rows != self.rows {
            log::warn!("Clamping rows from {} to {}", self.rows, rows);
            self.rows = rows;
        }

        let columns = self.columns.clamp(MIN_DIMENSION, MAX_DIMENSION);
        if columns != self.columns {
            log::warn!("Clamping columns from {} to {}", self.columns, columns);
            self.columns = columns;
        }

        let pieces_to_win = self.pieces_to_win.clamp(MIN_PIECES_TO_WIN, self.max_line());
        if pieces_to_win != self.pieces_to_win {
            log::warn!(
                "Clamping pieces to win from {} to {}",
                self.pieces_to_win,
                pieces_to_win
            );
            self.pieces_to_win = pieces_to_win;
        }

        if !(self.drop_speed.is_finite() && self.drop_speed > 0.0) {
            log::warn!(
                "Replacing drop speed {} with {}",
                self.drop_speed,
                DEFAULT_DROP_SPEED
            );
            self.drop_speed = DEFAULT_DROP_SPEED;
        }

        self
    }

    /// Strict validation: report the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&self.rows) {
            return Err(ConfigError::RowsOutOfRange(self.rows));
        }

        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&self.columns) {
            return Err(ConfigError::ColumnsOutOfRange(self.columns));
        }

        let max = self.max_line();
        if !(MIN_PIECES_TO_WIN..=max).contains(&self.pieces_to_win) {
            return Err(ConfigError::PiecesToWinOutOfRange {
                value: self.pieces_to_win,
                max,
            });
        }

        if !(self.drop_speed.is_finite() && self.drop_speed > 0.0) {
            return Err(ConfigError::InvalidDropSpeed(self.drop_speed));
        }

        Ok(())
    }
}
