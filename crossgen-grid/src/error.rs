use thiserror::Error;

use crate::slot::Direction;

/// Structural violations of a [`crate::grid::GridModel`], per the grid's validation
/// invariants (symmetry, connectivity, minimum slot length, checked squares).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("row {row} has {actual} columns but row 0 has {expected}")]
    InconsistentRowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid character '{value}' at row {row}, column {col}")]
    InvalidCharacter { row: usize, col: usize, value: char },

    #[error("position ({row},{col}) is out of bounds for a {size}x{size} grid")]
    OutOfBounds { row: usize, col: usize, size: usize },

    #[error(
        "cell ({row},{col}) block={block} but its symmetric mirror ({mirror_row},{mirror_col}) block={mirror_block}"
    )]
    AsymmetricBlock {
        row: usize,
        col: usize,
        block: bool,
        mirror_row: usize,
        mirror_col: usize,
        mirror_block: bool,
    },

    #[error("grid is not connected: {unreached} open cell(s) unreachable from the seed")]
    Disconnected { unreached: usize },

    #[error(
        "{direction:?} slot starting at ({row},{col}) has length {length}, shorter than minimum {min_length}"
    )]
    SlotTooShort {
        row: usize,
        col: usize,
        direction: Direction,
        length: usize,
        min_length: usize,
    },

    #[error(
        "cell ({row},{col}) is covered by {count} {direction:?} slot(s), expected exactly 1 (\"checked\" invariant)"
    )]
    NotChecked {
        row: usize,
        col: usize,
        direction: Direction,
        count: usize,
    },
}
