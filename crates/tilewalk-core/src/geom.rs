//! Geometry primitives: [`Point`] and [`Range`].
//!
//! A tile map is addressed by `Point { x: column, y: row }`, with `y`
//! growing downwards, so "up" is `y - 1`.

use std::fmt;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A tile position: `x` is the column, `y` the row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether either component is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.x < 0 || self.y < 0
    }

    /// The four orthogonal neighbours in up, down, right, left order.
    ///
    /// Search expansion order depends on this sequence.
    #[inline]
    pub const fn cardinal(self) -> [Point; 4] {
        [
            Self::new(self.x, self.y - 1),
            Self::new(self.x, self.y + 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
        ]
    }

    /// Grid (L1) distance to `other`.
    #[inline]
    pub const fn manhattan(self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle \[min, max). `min` is inclusive, `max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Create a new range from two corners, canonicalized so that
    /// `min` <= `max` on each axis.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Row-major iterator over every point in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: self.min,
        }
    }
}

/// Row-major iterator over the points of a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Point,
}

impl Iterator for RangeIter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let Range { min, max } = self.range;
        if self.cur.y >= max.y || min.x >= max.x {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= max.x {
            self.cur.x = min.x;
            self.cur.y += 1;
        }
        Some(p)
    }
}
