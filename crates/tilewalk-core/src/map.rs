//! The [`TileMap`] type — a fixed-size grid of traversal weights.
//!
//! Each tile holds a weight in `[0.0, 1.0]`: `0.0` is free to cross and
//! `1.0` is closed. A tile is *open* while its weight is below `1.0`.
//! Tiles are addressed either by [`Point`] or by a row-major tile id.
//!
//! Maps can also be written as ASCII text:
//!
//! | char | meaning |
//! |---|---|
//! | `.` | weight 0.0 |
//! | `#` | weight 1.0 (closed) |
//! | `1`–`9` | weight 0.1–0.9 |
//! | `S` | start tile, weight 0.0 |
//! | `E` | end tile, weight 0.0 |

use std::fmt;

use crate::error::MapError;
use crate::geom::{Point, Range};

/// Weight of a fully passable tile.
pub const OPEN: f32 = 0.0;
/// Weight of an impassable tile.
pub const CLOSED: f32 = 1.0;

/// Clamp a weight into `[0, 1]`. NaN is treated as closed.
#[inline]
pub fn clamp_weight(w: f32) -> f32 {
    if w.is_nan() { CLOSED } else { w.clamp(OPEN, CLOSED) }
}

/// A rectangular map of weighted tiles with a start and an end tile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawTileMap")
)]
pub struct TileMap {
    columns: i32,
    rows: i32,
    weights: Vec<f32>,
    start_tile: Point,
    end_tile: Point,
}

impl TileMap {
    /// Create a map with every tile open (weight 0.0).
    ///
    /// The start tile is the top-left corner and the end tile the
    /// bottom-right corner.
    pub fn new(columns: i32, rows: i32) -> Result<Self, MapError> {
        let len = check_dimensions(columns, rows)?;
        Ok(Self::from_parts(columns, rows, vec![OPEN; len]))
    }

    /// Create a map from a row-major weight vector of exactly
    /// `columns * rows` entries. Weights are clamped into `[0, 1]`.
    pub fn with_tiles(columns: i32, rows: i32, tiles: Vec<f32>) -> Result<Self, MapError> {
        let expected = check_dimensions(columns, rows)?;
        if tiles.len() != expected {
            return Err(MapError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        let weights = tiles.into_iter().map(clamp_weight).collect();
        Ok(Self::from_parts(columns, rows, weights))
    }

    fn from_parts(columns: i32, rows: i32, weights: Vec<f32>) -> Self {
        Self {
            columns,
            rows,
            weights,
            start_tile: Point::ZERO,
            end_tile: Point::new(columns - 1, rows - 1),
        }
    }

    /// Parse a map from ASCII text (see the module docs for the notation).
    ///
    /// Surrounding whitespace is trimmed from the whole text and from each
    /// line; every line must then have the same width.
    pub fn parse(s: &str) -> Result<Self, MapError> {
        let lines: Vec<&str> = s.trim().lines().map(str::trim).collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        if width == 0 {
            return Err(MapError::EmptyMap);
        }

        let mut weights = Vec::with_capacity(width * lines.len());
        let mut start = None;
        let mut end = None;
        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(MapError::InconsistentWidth { line: y });
            }
            for (x, ch) in line.chars().enumerate() {
                let p = Point::new(x as i32, y as i32);
                let w = match ch {
                    '.' => OPEN,
                    '#' => CLOSED,
                    'S' => {
                        start = Some(p);
                        OPEN
                    }
                    'E' => {
                        end = Some(p);
                        OPEN
                    }
                    '1'..='9' => f32::from(ch as u8 - b'0') / 10.0,
                    _ => return Err(MapError::InvalidTile { ch, x: p.x, y: p.y }),
                };
                weights.push(w);
            }
        }

        let mut map = Self::with_tiles(width as i32, lines.len() as i32, weights)?;
        if let Some(p) = start {
            map.start_tile = p;
        }
        if let Some(p) = end {
            map.end_tile = p;
        }
        Ok(map)
    }

    // -----------------------------------------------------------------------
    // Dimensions
    // -----------------------------------------------------------------------

    #[inline]
    pub fn columns(&self) -> i32 {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of tiles.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Never true: every way of building a map, deserialization included,
    /// rejects zero tiles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The map rectangle, `[0, 0]-[columns, rows)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.columns, self.rows)
    }

    /// Whether `p` lies on the map.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    /// Whether the tile at (`column`, `row`) lies on the map.
    #[inline]
    pub fn contains_cell(&self, column: i32, row: i32) -> bool {
        self.contains(Point::new(column, row))
    }

    // -----------------------------------------------------------------------
    // Addressing
    // -----------------------------------------------------------------------

    /// Row-major tile id of `p`.
    pub fn tile_id(&self, p: Point) -> Result<usize, MapError> {
        if p.is_negative() {
            return Err(MapError::NegativeCoordinate { x: p.x, y: p.y });
        }
        if !self.contains(p) {
            return Err(MapError::PositionOutOfBounds { x: p.x, y: p.y });
        }
        Ok(p.y as usize * self.columns as usize + p.x as usize)
    }

    /// Position of tile `id`.
    pub fn position(&self, id: usize) -> Result<Point, MapError> {
        self.check_id(id)?;
        let cols = self.columns as usize;
        Ok(Point::new((id % cols) as i32, (id / cols) as i32))
    }

    fn check_id(&self, id: usize) -> Result<(), MapError> {
        if id >= self.weights.len() {
            return Err(MapError::TileIdOutOfRange {
                id,
                len: self.weights.len(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Weights
    // -----------------------------------------------------------------------

    pub fn tile_weight(&self, id: usize) -> Result<f32, MapError> {
        self.check_id(id)?;
        Ok(self.weights[id])
    }

    /// Set the weight of tile `id`, clamped into `[0, 1]`.
    pub fn set_tile_weight(&mut self, id: usize, weight: f32) -> Result<(), MapError> {
        self.check_id(id)?;
        self.weights[id] = clamp_weight(weight);
        Ok(())
    }

    pub fn weight(&self, p: Point) -> Result<f32, MapError> {
        let id = self.tile_id(p)?;
        Ok(self.weights[id])
    }

    /// Set the weight at `p`, clamped into `[0, 1]`.
    pub fn set_weight(&mut self, p: Point, weight: f32) -> Result<(), MapError> {
        let id = self.tile_id(p)?;
        self.weights[id] = clamp_weight(weight);
        Ok(())
    }

    pub fn cell_weight(&self, column: i32, row: i32) -> Result<f32, MapError> {
        self.weight(Point::new(column, row))
    }

    pub fn set_cell_weight(&mut self, column: i32, row: i32, weight: f32) -> Result<(), MapError> {
        self.set_weight(Point::new(column, row), weight)
    }

    /// Set every tile to `weight` (clamped).
    pub fn fill(&mut self, weight: f32) {
        let w = clamp_weight(weight);
        self.weights.iter_mut().for_each(|t| *t = w);
    }

    /// Whether `p` is on the map and its weight is below [`CLOSED`].
    #[inline]
    pub fn is_open(&self, p: Point) -> bool {
        self.tile_id(p).is_ok_and(|id| self.weights[id] < CLOSED)
    }

    /// Open orthogonal neighbours of `p`, in up, down, right, left order.
    pub fn open_neighbors(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        p.cardinal().into_iter().filter(|&n| self.is_open(n))
    }

    /// Row-major iterator over `(Point, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, f32)> + '_ {
        self.bounds().iter().zip(self.weights.iter().copied())
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    #[inline]
    pub fn start_tile(&self) -> Point {
        self.start_tile
    }

    pub fn set_start_tile(&mut self, p: Point) -> Result<(), MapError> {
        self.tile_id(p)?;
        self.start_tile = p;
        Ok(())
    }

    #[inline]
    pub fn end_tile(&self) -> Point {
        self.end_tile
    }

    pub fn set_end_tile(&mut self, p: Point) -> Result<(), MapError> {
        self.tile_id(p)?;
        self.end_tile = p;
        Ok(())
    }
}

/// Validate the dimensions and return the tile count. The count must fit
/// an `i32`, like the coordinates addressing it.
fn check_dimensions(columns: i32, rows: i32) -> Result<usize, MapError> {
    match columns.checked_mul(rows) {
        Some(len) if columns > 0 && rows > 0 => Ok(len as usize),
        _ => Err(MapError::InvalidDimensions { columns, rows }),
    }
}

/// Wire shape of a [`TileMap`]; converted through the checked constructors.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTileMap {
    columns: i32,
    rows: i32,
    weights: Vec<f32>,
    start_tile: Point,
    end_tile: Point,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTileMap> for TileMap {
    type Error = MapError;

    fn try_from(raw: RawTileMap) -> Result<Self, MapError> {
        let mut map = Self::with_tiles(raw.columns, raw.rows, raw.weights)?;
        map.set_start_tile(raw.start_tile)?;
        map.set_end_tile(raw.end_tile)?;
        Ok(map)
    }
}

/// Renders the map in the notation accepted by [`TileMap::parse`].
/// Intermediate weights round to the nearest tenth.
impl fmt::Display for TileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (p, w) in self.iter() {
            if p.x == 0 && p.y > 0 {
                writeln!(f)?;
            }
            let ch = if p == self.start_tile {
                'S'
            } else if p == self.end_tile {
                'E'
            } else {
                weight_char(w)
            };
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

fn weight_char(w: f32) -> char {
    if w >= CLOSED {
        return '#';
    }
    match (w * 10.0).round() as u32 {
        0 => '.',
        n @ 1..=9 => char::from(b'0' + n as u8),
        _ => '9',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "\
S..#
.#2.
...E";

    #[test]
    fn new_rejects_non_positive_dimensions() {
        assert_eq!(
            TileMap::new(0, 5),
            Err(MapError::InvalidDimensions {
                columns: 0,
                rows: 5
            })
        );
        assert!(TileMap::new(5, -1).is_err());
        assert_eq!(
            TileMap::new(i32::MAX, i32::MAX),
            Err(MapError::InvalidDimensions {
                columns: i32::MAX,
                rows: i32::MAX
            })
        );
        assert!(TileMap::with_tiles(i32::MAX, 2, Vec::new()).is_err());
        assert!(TileMap::new(1, 1).is_ok());
    }

    #[test]
    fn with_tiles_checks_length() {
        let err = TileMap::with_tiles(5, 5, vec![0.0; 24]).unwrap_err();
        assert_eq!(
            err,
            MapError::TileCountMismatch {
                expected: 25,
                actual: 24
            }
        );
        assert!(TileMap::with_tiles(5, 5, vec![0.0; 25]).is_ok());
    }

    #[test]
    fn with_tiles_clamps() {
        let map = TileMap::with_tiles(2, 1, vec![-3.0, 7.5]).unwrap();
        assert_eq!(map.tile_weight(0), Ok(0.0));
        assert_eq!(map.tile_weight(1), Ok(1.0));
    }

    #[test]
    fn set_then_get_weight_clamps() {
        let mut map = TileMap::new(3, 3).unwrap();
        for v in [-10.0, -0.1, 0.0, 0.25, 0.5, 0.999, 1.0, 1.5, 1e9] {
            map.set_tile_weight(4, v).unwrap();
            assert_eq!(map.tile_weight(4).unwrap(), v.clamp(0.0, 1.0));
        }
        map.set_tile_weight(4, f32::NAN).unwrap();
        assert_eq!(map.tile_weight(4).unwrap(), CLOSED);
    }

    #[test]
    fn tile_id_errors() {
        let mut map = TileMap::new(3, 2).unwrap();
        assert_eq!(
            map.tile_weight(6),
            Err(MapError::TileIdOutOfRange { id: 6, len: 6 })
        );
        assert_eq!(
            map.cell_weight(-1, 0),
            Err(MapError::NegativeCoordinate { x: -1, y: 0 })
        );
        assert_eq!(
            map.set_cell_weight(3, 0, 0.5),
            Err(MapError::PositionOutOfBounds { x: 3, y: 0 })
        );
        assert_eq!(map.tile_id(Point::new(2, 1)), Ok(5));
        assert_eq!(map.position(5), Ok(Point::new(2, 1)));
    }

    #[test]
    fn contains_is_strict_at_edges() {
        let map = TileMap::new(3, 2).unwrap();
        assert!(map.contains_cell(2, 1));
        assert!(!map.contains_cell(3, 1));
        assert!(!map.contains_cell(2, 2));
        assert!(!map.contains_cell(-1, 0));
    }

    #[test]
    fn open_neighbors_skip_closed_and_outside() {
        let map = TileMap::parse(ROOM).unwrap();
        let n: Vec<_> = map.open_neighbors(Point::new(1, 0)).collect();
        // up is outside, down is '#'
        assert_eq!(n, vec![Point::new(2, 0), Point::new(0, 0)]);
        let n: Vec<_> = map.open_neighbors(Point::new(2, 1)).collect();
        assert_eq!(n, vec![Point::new(2, 0), Point::new(2, 2), Point::new(3, 1)]);
    }

    #[test]
    fn parse_reads_endpoints_and_weights() {
        let map = TileMap::parse(ROOM).unwrap();
        assert_eq!(map.columns(), 4);
        assert_eq!(map.rows(), 3);
        assert_eq!(map.start_tile(), Point::new(0, 0));
        assert_eq!(map.end_tile(), Point::new(3, 2));
        assert_eq!(map.weight(Point::new(3, 0)), Ok(CLOSED));
        assert_eq!(map.weight(Point::new(2, 1)), Ok(0.2));
        assert!(!map.is_open(Point::new(1, 1)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(TileMap::parse("  \n "), Err(MapError::EmptyMap));
        assert_eq!(
            TileMap::parse("...\n..\n..."),
            Err(MapError::InconsistentWidth { line: 1 })
        );
        assert_eq!(
            TileMap::parse("..\n.x"),
            Err(MapError::InvalidTile { ch: 'x', x: 1, y: 1 })
        );
    }

    #[test]
    fn display_matches_parse_notation() {
        let map = TileMap::parse(ROOM).unwrap();
        assert_eq!(map.to_string(), ROOM);
    }

    #[test]
    fn endpoints_must_be_on_the_map() {
        let mut map = TileMap::new(2, 2).unwrap();
        assert_eq!(map.end_tile(), Point::new(1, 1));
        assert!(map.set_end_tile(Point::new(2, 0)).is_err());
        map.set_start_tile(Point::new(1, 0)).unwrap();
        assert_eq!(map.start_tile(), Point::new(1, 0));
    }
}
