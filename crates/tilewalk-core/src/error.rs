use thiserror::Error;

/// Errors raised when building or addressing a [`TileMap`](crate::TileMap).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Columns and rows must both be positive, and the tile count must fit an `i32`.
    #[error("invalid map dimensions {columns}x{rows}: both must be positive and their product fit an i32")]
    InvalidDimensions { columns: i32, rows: i32 },

    /// A pre-populated tile vector does not match `columns * rows`.
    #[error("expected {expected} tiles, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },

    /// A tile id past the end of the map.
    #[error("tile id {id} out of range for a map of {len} tiles")]
    TileIdOutOfRange { id: usize, len: usize },

    /// Column/row accessors reject negative components.
    #[error("negative tile coordinate ({x}, {y})")]
    NegativeCoordinate { x: i32, y: i32 },

    /// A non-negative position past the right or bottom edge.
    #[error("tile ({x}, {y}) is outside the map")]
    PositionOutOfBounds { x: i32, y: i32 },

    /// ASCII map text with no tiles.
    #[error("map text is empty")]
    EmptyMap,

    /// ASCII map lines of differing width.
    #[error("map line {line} has a different width from the first line")]
    InconsistentWidth { line: usize },

    /// A character outside the map notation.
    #[error("invalid tile character \u{201c}{ch}\u{201d} at ({x}, {y})")]
    InvalidTile { ch: char, x: i32, y: i32 },
}
