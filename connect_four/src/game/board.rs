use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    config::GameConfig,
    entities::{Cell, Column, PlayerId, Row},
    errors::{DropError, DropResult},
};

/// Fixed-size grid of cells.
///
/// Row 0 is the bottom of the board; pieces stack upward. Cells are stored column-major so
/// a column is a contiguous bottom-to-top slice. The only mutation is [`Board::place`], which
/// writes a single empty cell, so a cell goes Empty -> occupied at most once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

/// Immutable copy of the grid for observers that join late or need to resync.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub columns: usize,
    /// One entry per column, each listed bottom-to-top.
    pub cells: Vec<Vec<Cell>>,
}

impl BoardSnapshot {
    /// Cell at `(column, row)`, if in range.
    #[must_use]
    pub fn get(&self, column: Column, row: Row) -> Option<Cell> {
        self.cells.get(column).and_then(|c| c.get(row)).copied()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn pieces(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }
}

impl Board {
    /// Empty board with the configured dimensions.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self::with_dimensions(config.rows, config.columns)
    }

    #[must_use]
    pub fn with_dimensions(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Cell::Empty; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, column: Column, row: Row) -> usize {
        column * self.rows + row
    }

    fn column_cells(&self, column: Column) -> &[Cell] {
        let start = self.index(column, 0);
        &self.cells[start..start + self.rows]
    }

    /// Cell at `(column, row)`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, column: Column, row: Row) -> Option<Cell> {
        if column < self.columns && row < self.rows {
            Some(self.cells[self.index(column, row)])
        } else {
            None
        }
    }

    /// Fails with `InvalidColumn` unless `column` is in `[0, columns)`.
    pub fn check_column(&self, column: Column) -> DropResult<()> {
        if column < self.columns {
            Ok(())
        } else {
            Err(DropError::InvalidColumn {
                column,
                columns: self.columns,
            })
        }
    }

    /// A column is full once its top cell is occupied.
    pub fn is_column_full(&self, column: Column) -> DropResult<bool> {
        self.check_column(column)?;
        Ok(!self.cells[self.index(column, self.rows - 1)].is_empty())
    }

    /// First empty row scanning up from the bottom, or `None` if the column is full.
    pub fn lowest_free_row(&self, column: Column) -> DropResult<Option<Row>> {
        self.check_column(column)?;
        Ok(self
            .column_cells(column)
            .iter()
            .position(|cell| cell.is_empty()))
    }

    /// Write `player`'s piece into the lowest free row of `column` and return that row.
    pub fn place(&mut self, column: Column, player: PlayerId) -> DropResult<Row> {
        let row = self
            .lowest_free_row(column)?
            .ok_or(DropError::ColumnFull { column })?;
        let idx = self.index(column, row);
        self.cells[idx] = player.cell();
        Ok(row)
    }

    /// True iff no empty cell remains anywhere.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn pieces(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Columns that can still accept a piece, left to right.
    #[must_use]
    pub fn free_columns(&self) -> Vec<Column> {
        (0..self.columns)
            .filter(|&column| self.column_cells(column).iter().any(|cell| cell.is_empty()))
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.rows,
            columns: self.columns,
            cells: (0..self.columns)
                .map(|column| self.column_cells(column).to_vec())
                .collect(),
        }
    }
}

impl fmt::Display for Board {
    /// Top row first, one line per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            for column in 0..self.columns {
                write!(f, "{}", self.cells[self.index(column, row)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
