//! Node-selection policies.
//!
//! A [`Strategy`] looks at the open list and decides which nodes the engine
//! expands next. All three policies here are stateless unit structs;
//! [`SearchMethod`] wraps them for choosing one at runtime.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::node::SearchNode;

/// Chooses which open-list nodes a search step expands.
pub trait Strategy {
    /// The node to expand next, or `None` when nothing is eligible.
    fn select_next(&self, open: &[SearchNode]) -> Option<SearchNode>;

    /// Nodes to expand during one step, in order. An empty result ends the
    /// search with no path.
    ///
    /// Defaults to the single node picked by [`select_next`](Self::select_next).
    fn expansion_order(&self, open: &[SearchNode]) -> Vec<SearchNode> {
        self.select_next(open).into_iter().collect()
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn select_next(&self, open: &[SearchNode]) -> Option<SearchNode> {
        (**self).select_next(open)
    }

    fn expansion_order(&self, open: &[SearchNode]) -> Vec<SearchNode> {
        (**self).expansion_order(open)
    }
}

/// FIFO: always the oldest open node. Heuristics are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirst;

impl Strategy for BreadthFirst {
    fn select_next(&self, open: &[SearchNode]) -> Option<SearchNode> {
        open.first().copied()
    }
}

/// Greedy: the node with the smallest `distance_to_goal`. The earliest
/// node wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFirst;

impl Strategy for BestFirst {
    fn select_next(&self, open: &[SearchNode]) -> Option<SearchNode> {
        let mut best: Option<SearchNode> = None;
        for &node in open {
            match best {
                Some(b) if node.distance_to_goal >= b.distance_to_goal => {}
                _ => best = Some(node),
            }
        }
        best
    }
}

/// Minimum `distance_traveled + distance_to_goal`; among equal costs the
/// deeper node (larger `distance_traveled`) wins.
///
/// The step hands the best-so-far candidate to expansion after every
/// scanned node, so a single step expands the first open node plus every
/// node that improved on the candidate during the scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl AStar {
    fn better(node: &SearchNode, than: &SearchNode) -> bool {
        let (f, bf) = (node.cost(), than.cost());
        f < bf || (f == bf && node.distance_traveled > than.distance_traveled)
    }
}

impl Strategy for AStar {
    fn select_next(&self, open: &[SearchNode]) -> Option<SearchNode> {
        let mut best: Option<SearchNode> = None;
        for &node in open {
            match best {
                Some(b) if !Self::better(&node, &b) => {}
                _ => best = Some(node),
            }
        }
        best
    }

    fn expansion_order(&self, open: &[SearchNode]) -> Vec<SearchNode> {
        let mut order: Vec<SearchNode> = Vec::new();
        let mut best: Option<SearchNode> = None;
        for &node in open {
            let candidate = match best {
                Some(b) if !Self::better(&node, &b) => b,
                _ => node,
            };
            best = Some(candidate);
            // Expanding the same node twice in a row changes nothing.
            if order.last() != Some(&candidate) {
                order.push(candidate);
            }
        }
        order
    }
}

// ---------------------------------------------------------------------------
// SearchMethod
// ---------------------------------------------------------------------------

/// Runtime choice between the built-in strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMethod {
    #[default]
    BreadthFirst,
    BestFirst,
    AStar,
}

impl SearchMethod {
    pub const ALL: [SearchMethod; 3] = [Self::BreadthFirst, Self::BestFirst, Self::AStar];
}

impl Strategy for SearchMethod {
    fn select_next(&self, open: &[SearchNode]) -> Option<SearchNode> {
        match self {
            Self::BreadthFirst => BreadthFirst.select_next(open),
            Self::BestFirst => BestFirst.select_next(open),
            Self::AStar => AStar.select_next(open),
        }
    }

    fn expansion_order(&self, open: &[SearchNode]) -> Vec<SearchNode> {
        match self {
            Self::BreadthFirst => BreadthFirst.expansion_order(open),
            Self::BestFirst => BestFirst.expansion_order(open),
            Self::AStar => AStar.expansion_order(open),
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BreadthFirst => "breadth-first",
            Self::BestFirst => "best-first",
            Self::AStar => "astar",
        })
    }
}

/// A search method name that [`SearchMethod::from_str`] does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search method \u{201c}{0}\u{201d} (expected breadth-first, best-first or astar)")]
pub struct UnknownMethod(pub String);

impl FromStr for SearchMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breadth-first" | "breadthfirst" | "bfs" => Ok(Self::BreadthFirst),
            "best-first" | "bestfirst" | "greedy" => Ok(Self::BestFirst),
            "astar" | "a-star" | "a*" => Ok(Self::AStar),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}
