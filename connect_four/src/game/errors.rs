//! Rejection reasons for a single drop request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Column, PlayerId};

/// Why a drop request was rejected.
///
/// None of these are fatal to the match: a rejected request changes nothing and the
/// requester may simply ask again.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropError {
    #[error("column {column} is outside the board (0..{columns})")]
    InvalidColumn { column: Column, columns: usize },
    #[error("column {column} is full")]
    ColumnFull { column: Column },
    #[error("not your turn, waiting on {current}")]
    NotYourTurn { current: PlayerId },
    #[error("game is already over")]
    GameAlreadyOver,
}

/// Result type for board and authority operations
pub type DropResult<T> = Result<T, DropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_error_display() {
        let err = DropError::InvalidColumn {
            column: 9,
            columns: 7,
        };
        assert_eq!(err.to_string(), "column 9 is outside the board (0..7)");

        let err = DropError::NotYourTurn {
            current: PlayerId::PlayerA,
        };
        assert_eq!(err.to_string(), "not your turn, waiting on player A");
    }

    #[test]
    fn drop_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(DropError::ColumnFull { column: 2 }).unwrap();
        assert_eq!(json["kind"], "column_full");
        assert_eq!(json["column"], 2);

        let json = serde_json::to_value(DropError::GameAlreadyOver).unwrap();
        assert_eq!(json["kind"], "game_already_over");
    }
}
