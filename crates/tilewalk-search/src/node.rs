use std::fmt;
use std::hash::{Hash, Hasher};

use tilewalk_core::Point;

use crate::traits::TileSource;

/// Estimated distance from `from` to `goal`: the Manhattan distance scaled
/// by the weight of `from` itself, truncated towards zero.
///
/// This is not an admissible A* heuristic. A tile of weight 0 estimates
/// zero remaining distance wherever it lies.
#[inline]
pub fn estimate(weight: f32, from: Point, goal: Point) -> i32 {
    (weight * from.manhattan(goal) as f32) as i32
}

/// One discovered tile: its position, its estimated distance to the goal
/// and the number of hops taken from the start to reach it.
///
/// Nodes compare and hash by position only.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchNode {
    pub position: Point,
    pub distance_to_goal: i32,
    pub distance_traveled: i32,
}

impl SearchNode {
    pub const fn new(position: Point, distance_to_goal: i32, distance_traveled: i32) -> Self {
        Self {
            position,
            distance_to_goal,
            distance_traveled,
        }
    }

    /// Build the node for `position`, reached after `distance_traveled` hops,
    /// with its estimate taken against `map`'s end tile.
    pub fn discover<M: TileSource + ?Sized>(
        map: &M,
        position: Point,
        distance_traveled: i32,
    ) -> Self {
        let distance_to_goal = estimate(map.weight(position), position, map.end_tile());
        Self::new(position, distance_to_goal, distance_traveled)
    }

    /// `distance_traveled + distance_to_goal`.
    #[inline]
    pub const fn cost(&self) -> i32 {
        self.distance_traveled + self.distance_to_goal
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for SearchNode {}

impl Hash for SearchNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

/// Lifecycle of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// Not stepping. Lists are kept as they are.
    #[default]
    Stopped,
    Searching,
    /// The frontier ran dry before the end tile was expanded.
    NoPath,
    PathFound,
}

impl SearchStatus {
    /// Whether the search has finished, with or without a path.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::NoPath | Self::PathFound)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Searching => "searching",
            Self::NoPath => "no path",
            Self::PathFound => "path found",
        })
    }
}
