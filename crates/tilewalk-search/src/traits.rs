use tilewalk_core::{CLOSED, Point, TileMap};

/// Read-only view of a weighted tile map, as consumed by the search engine.
///
/// The engine never caches weights: every query goes through this trait
/// at the moment a tile is discovered.
pub trait TileSource {
    /// Whether `p` lies on the map.
    fn contains(&self, p: Point) -> bool;

    /// Traversal weight at `p`, in `[0, 1]`. Tiles off the map read as closed.
    fn weight(&self, p: Point) -> f32;

    /// Append the open orthogonal neighbours of `p` into `buf`, in up, down,
    /// right, left order. The caller clears `buf` before calling.
    fn neighbors_open(&self, p: Point, buf: &mut Vec<Point>);

    fn start_tile(&self) -> Point;

    fn end_tile(&self) -> Point;
}

impl TileSource for TileMap {
    #[inline]
    fn contains(&self, p: Point) -> bool {
        TileMap::contains(self, p)
    }

    #[inline]
    fn weight(&self, p: Point) -> f32 {
        TileMap::weight(self, p).unwrap_or(CLOSED)
    }

    fn neighbors_open(&self, p: Point, buf: &mut Vec<Point>) {
        buf.extend(self.open_neighbors(p));
    }

    #[inline]
    fn start_tile(&self) -> Point {
        TileMap::start_tile(self)
    }

    #[inline]
    fn end_tile(&self) -> Point {
        TileMap::end_tile(self)
    }
}
