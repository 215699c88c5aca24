//! N-in-a-row detection.
//!
//! The scan is a pure function of the board. Cells are visited column-major (column
//! ascending, then row ascending) and at each cell the axes are tried in [`Axis::ALL`] order,
//! so when a single drop completes several lines at once the reported line is always the
//! first one under that order.

use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    config::GameConfig,
    entities::{Column, PlayerId, Row},
};

/// Direction a line runs in, starting from its first cell.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
    DiagonalUpRight,
    DiagonalUpLeft,
}

impl Axis {
    /// Scan order.
    pub const ALL: [Axis; 4] = [
        Axis::Horizontal,
        Axis::Vertical,
        Axis::DiagonalUpRight,
        Axis::DiagonalUpLeft,
    ];

    /// `(column, row)` step between consecutive cells.
    #[must_use]
    pub const fn step(self) -> (isize, isize) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
            Self::DiagonalUpRight => (1, 1),
            Self::DiagonalUpLeft => (-1, 1),
        }
    }

    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(self, Self::DiagonalUpRight | Self::DiagonalUpLeft)
    }
}

/// A board coordinate.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Position {
    pub column: Column,
    pub row: Row,
}

/// A completed line of `pieces_to_win` same-owner cells.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WinningLine {
    pub owner: PlayerId,
    pub axis: Axis,
    /// Cells from the scan start outward along `axis`.
    pub cells: Vec<Position>,
}

/// Owner of the first winning line, if any.
#[must_use]
pub fn check_win(board: &Board, config: &GameConfig) -> Option<PlayerId> {
    find_winning_line(board, config).map(|line| line.owner)
}

/// First winning line under the fixed scan order.
#[must_use]
pub fn find_winning_line(board: &Board, config: &GameConfig) -> Option<WinningLine> {
    let length = config.pieces_to_win;
    if length == 0 {
        return None;
    }

    for column in 0..board.columns() {
        for row in 0..board.rows() {
            for axis in Axis::ALL {
                if axis.is_diagonal() && !config.allow_diagonal {
                    continue;
                }
                if let Some(line) = line_from(board, column, row, axis, length) {
                    return Some(line);
                }
            }
        }
    }

    None
}

/// Last cell of a `length`-long line starting at `(column, row)`, if it stays on the board.
///
/// Lines are straight, so the start and end being in range puts every offset in range.
fn line_end(
    board: &Board,
    column: Column,
    row: Row,
    axis: Axis,
    length: usize,
) -> Option<Position> {
    let (dc, dr) = axis.step();
    let span = isize::try_from(length - 1).ok()?;
    let end_column = isize::try_from(column).ok()? + dc * span;
    let end_row = isize::try_from(row).ok()? + dr * span;

    let end_column = usize::try_from(end_column).ok()?;
    let end_row = usize::try_from(end_row).ok()?;
    (end_column < board.columns() && end_row < board.rows()).then_some(Position {
        column: end_column,
        row: end_row,
    })
}

fn line_from(
    board: &Board,
    column: Column,
    row: Row,
    axis: Axis,
    length: usize,
) -> Option<WinningLine> {
    let owner = board.get(column, row)?.owner()?;
    line_end(board, column, row, axis, length)?;

    let (dc, dr) = axis.step();
    let mut cells = Vec::with_capacity(length);
    for offset in 0..length {
        let offset = offset as isize;
        let position = Position {
            column: (column as isize + dc * offset) as usize,
            row: (row as isize + dr * offset) as usize,
        };
        if board.get(position.column, position.row)?.owner() != Some(owner) {
            return None;
        }
        cells.push(position);
    }

    Some(WinningLine { owner, axis, cells })
}
