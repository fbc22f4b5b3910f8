//! **tilewalk-core** — weighted tile maps and grid geometry.
//!
//! This crate provides the map side of *tilewalk*: the [`Point`] and
//! [`Range`] geometry primitives and the [`TileMap`] of traversal weights
//! that the search engine in `tilewalk-search` walks over.

pub mod error;
pub mod geom;
pub mod map;

pub use error::MapError;
pub use geom::{Point, Range};
pub use map::{CLOSED, OPEN, TileMap, clamp_weight};
