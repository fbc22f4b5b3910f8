//! Incremental search over weighted tile maps.
//!
//! A [`PathFinder`] advances one expansion step at a time, gated by elapsed
//! time the caller feeds in, and reconstructs the route from the
//! predecessor links it records along the way. Which frontier node is
//! expanded next is up to its [`Strategy`]:
//!
//! | Strategy | Picks |
//! |---|---|
//! | [`BreadthFirst`] | the oldest open node |
//! | [`BestFirst`] | the smallest estimate to the goal |
//! | [`AStar`] | the smallest hops + estimate, deeper nodes on ties |
//!
//! ```
//! use std::time::Duration;
//! use tilewalk_core::TileMap;
//! use tilewalk_search::{BreadthFirst, PathFinder, SearchStatus};
//!
//! let map = TileMap::parse("S..\n.#.\n..E").unwrap();
//! let mut finder = PathFinder::new(BreadthFirst);
//! finder.start_search(&map);
//! while finder.is_searching() {
//!     finder.advance(&map, Duration::from_secs(5));
//! }
//! assert_eq!(finder.status(), SearchStatus::PathFound);
//! assert_eq!(finder.route().unwrap().len(), 5);
//! ```

mod config;
mod finder;
mod node;
mod strategy;
mod traits;

pub use config::{DEFAULT_STEP_INTERVAL, SearchConfig};
pub use finder::PathFinder;
pub use node::{SearchNode, SearchStatus, estimate};
pub use strategy::{AStar, BestFirst, BreadthFirst, SearchMethod, Strategy, UnknownMethod};
pub use traits::TileSource;
