use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two participants in a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerId {
    PlayerA,
    PlayerB,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::PlayerA, PlayerId::PlayerB];

    /// The other participant. Turns are strictly two-party round-robin.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::PlayerA => Self::PlayerB,
            Self::PlayerB => Self::PlayerA,
        }
    }

    /// The cell value a piece of this player occupies.
    #[must_use]
    pub const fn cell(self) -> Cell {
        match self {
            Self::PlayerA => Cell::PlayerA,
            Self::PlayerB => Cell::PlayerB,
        }
    }

    /// Zero-based seat index (A = 0, B = 1).
    #[must_use]
    pub const fn seat(self) -> usize {
        match self {
            Self::PlayerA => 0,
            Self::PlayerB => 1,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerA => "player A",
            Self::PlayerB => "player B",
        };
        write!(f, "{repr}")
    }
}

/// Occupancy of a single board cell.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    PlayerA,
    PlayerB,
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Owner of the piece in this cell, if any.
    #[must_use]
    pub const fn owner(self) -> Option<PlayerId> {
        match self {
            Self::Empty => None,
            Self::PlayerA => Some(PlayerId::PlayerA),
            Self::PlayerB => Some(PlayerId::PlayerB),
        }
    }
}

impl From<PlayerId> for Cell {
    fn from(value: PlayerId) -> Self {
        value.cell()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Empty => ".",
            Self::PlayerA => "A",
            Self::PlayerB => "B",
        };
        write!(f, "{repr}")
    }
}

/// Column index, zero-based from the left.
pub type Column = usize;

/// Row index, zero-based from the bottom.
pub type Row = usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_player_alternates() {
        assert_eq!(PlayerId::PlayerA.other(), PlayerId::PlayerB);
        assert_eq!(PlayerId::PlayerB.other(), PlayerId::PlayerA);
        assert_eq!(PlayerId::PlayerA.other().other(), PlayerId::PlayerA);
    }

    #[test]
    fn cell_owner_matches_player() {
        for player in PlayerId::ALL {
            assert_eq!(player.cell().owner(), Some(player));
        }
        assert_eq!(Cell::Empty.owner(), None);
        assert!(Cell::default().is_empty());
    }

    #[test]
    fn player_serializes_snake_case() {
        let json = serde_json::to_string(&PlayerId::PlayerB).unwrap();
        assert_eq!(json, "\"player_b\"");
    }
}
