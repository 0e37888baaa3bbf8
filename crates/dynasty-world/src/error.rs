//! Error types for the `dynasty-world` crate.
//!
//! All fallible map construction returns [`WorldError`].

use dynasty_types::Position;

/// Errors that can occur while building or editing a grid map.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A map must have at least one row and one column.
    #[error("grid must be at least 1x1, got {rows}x{cols}")]
    EmptyGrid {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        cols: u32,
    },

    /// Grid dimensions do not fit the coordinate type.
    #[error("grid {rows}x{cols} exceeds the coordinate range")]
    TooLarge {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        cols: u32,
    },

    /// A position lies outside the grid.
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),

    /// A blocked-tile density outside `0.0..1.0`.
    #[error("blocked tile density must be in [0, 1), got {0}")]
    InvalidDensity(f64),

    /// An ASCII map row has a different width than the first row.
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        actual: usize,
    },

    /// An ASCII map contains a character that is not a known tile.
    #[error("unknown tile {0:?}")]
    UnknownTile(char),
}
