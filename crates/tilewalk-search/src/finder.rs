//! The incremental search engine.
//!
//! A [`PathFinder`] holds the bookkeeping of one search (open list, closed
//! list, predecessor links) and advances it one step at a time. Which open
//! node gets expanded is decided by its [`Strategy`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use log::{debug, trace};
use tilewalk_core::Point;

use crate::config::SearchConfig;
use crate::node::{SearchNode, SearchStatus};
use crate::strategy::{SearchMethod, Strategy};
use crate::traits::TileSource;

/// Step-driven search over a [`TileSource`].
///
/// The map is borrowed per call, never stored, so its weights may change
/// between calls. Nothing is re-read for tiles that were already
/// discovered.
#[derive(Debug, Clone)]
pub struct PathFinder<S = SearchMethod> {
    strategy: S,
    status: SearchStatus,
    step_interval: Duration,
    time_since_last_step: Duration,
    total_steps: u64,
    open: Vec<SearchNode>,
    open_set: HashSet<Point>,
    closed: Vec<SearchNode>,
    closed_set: HashSet<Point>,
    predecessors: HashMap<Point, Point>,
    // end tile, recorded when it is expanded
    goal: Option<Point>,
    nbuf: Vec<Point>,
}

impl<S: Strategy> PathFinder<S> {
    /// Create a stopped engine with the default configuration.
    pub fn new(strategy: S) -> Self {
        Self::with_config(strategy, SearchConfig::default())
    }

    pub fn with_config(strategy: S, config: SearchConfig) -> Self {
        Self {
            strategy,
            status: SearchStatus::Stopped,
            step_interval: config.step_interval,
            time_since_last_step: Duration::ZERO,
            total_steps: 0,
            open: Vec::new(),
            open_set: HashSet::new(),
            closed: Vec::new(),
            closed_set: HashSet::new(),
            predecessors: HashMap::new(),
            goal: None,
            nbuf: Vec::with_capacity(4),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    #[inline]
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    #[inline]
    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    pub fn set_step_interval(&mut self, interval: Duration) {
        self.step_interval = interval;
    }

    #[inline]
    pub fn is_searching(&self) -> bool {
        self.status == SearchStatus::Searching
    }

    /// Arm or halt the search.
    ///
    /// `true` moves any state, terminal ones included, to `Searching`.
    /// `false` moves `Searching` to `Stopped` and leaves the other states
    /// alone. Lists are never touched.
    pub fn set_searching(&mut self, searching: bool) {
        if searching {
            self.set_status(SearchStatus::Searching);
        } else if self.is_searching() {
            self.set_status(SearchStatus::Stopped);
        }
    }

    /// Expansion attempts made so far. Not cleared by [`reset`](Self::reset).
    #[inline]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Frontier, oldest first.
    #[inline]
    pub fn open_list(&self) -> &[SearchNode] {
        &self.open
    }

    /// Expanded nodes, in expansion order.
    #[inline]
    pub fn closed_list(&self) -> &[SearchNode] {
        &self.closed
    }

    #[inline]
    pub fn is_open(&self, p: Point) -> bool {
        self.open_set.contains(&p)
    }

    #[inline]
    pub fn is_closed(&self, p: Point) -> bool {
        self.closed_set.contains(&p)
    }

    /// The tile `p` was discovered from, if any.
    #[inline]
    pub fn predecessor(&self, p: Point) -> Option<Point> {
        self.predecessors.get(&p).copied()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Clear the lists, the predecessor links and the step timer.
    ///
    /// The status and the step counter are left as they are; the caller
    /// re-arms the search and seeds the open list.
    pub fn reset(&mut self) {
        self.open.clear();
        self.open_set.clear();
        self.closed.clear();
        self.closed_set.clear();
        self.predecessors.clear();
        self.goal = None;
        self.time_since_last_step = Duration::ZERO;
    }

    /// Add `node` to the open list. Returns `false` if its tile is already
    /// open or closed.
    pub fn seed(&mut self, node: SearchNode) -> bool {
        if self.is_open(node.position) || self.is_closed(node.position) {
            return false;
        }
        self.push_open(node);
        true
    }

    /// Reset, seed the open list with `map`'s start tile and start
    /// searching.
    ///
    /// A start tile off the map ends the search at once with no path.
    pub fn start_search<M: TileSource + ?Sized>(&mut self, map: &M) {
        self.reset();
        let start = map.start_tile();
        if !map.contains(start) {
            debug!("start tile {start} is off the map");
            self.set_status(SearchStatus::NoPath);
            return;
        }
        self.seed(SearchNode::discover(map, start, 0));
        self.set_status(SearchStatus::Searching);
    }

    /// Feed elapsed time to the search.
    ///
    /// Does nothing unless searching. Once the accumulated time reaches the
    /// step interval and the open list holds a node, performs exactly one
    /// step and restarts the timer from zero, however much time has piled
    /// up. With an empty open list the time keeps accumulating.
    pub fn advance<M: TileSource + ?Sized>(&mut self, map: &M, elapsed: Duration) {
        if !self.is_searching() {
            return;
        }
        self.time_since_last_step = self.time_since_last_step.saturating_add(elapsed);
        if self.time_since_last_step >= self.step_interval && !self.open.is_empty() {
            self.time_since_last_step = Duration::ZERO;
            self.step(map);
        }
    }

    /// Perform one expansion attempt now, bypassing the step timer.
    ///
    /// Does nothing unless searching. Ends in `NoPath` when the strategy
    /// finds nothing to expand or when the frontier is empty afterwards.
    pub fn step<M: TileSource + ?Sized>(&mut self, map: &M) -> SearchStatus {
        if !self.is_searching() {
            return self.status;
        }
        self.total_steps += 1;

        let order = self.strategy.expansion_order(&self.open);
        if order.is_empty() {
            self.set_status(SearchStatus::NoPath);
            return self.status;
        }
        for node in order {
            if self.is_closed(node.position) {
                continue;
            }
            self.expand(map, node);
            if self.status == SearchStatus::PathFound {
                return self.status;
            }
        }

        if self.open.is_empty() {
            self.set_status(SearchStatus::NoPath);
        }
        self.status
    }

    /// Step until the search stops searching or `max_steps` attempts have
    /// been made. Returns the final status.
    pub fn run<M: TileSource + ?Sized>(&mut self, map: &M, max_steps: u64) -> SearchStatus {
        for _ in 0..max_steps {
            if !self.is_searching() {
                break;
            }
            self.step(map);
        }
        self.status
    }

    fn expand<M: TileSource + ?Sized>(&mut self, map: &M, node: SearchNode) {
        let mut nbuf = std::mem::take(&mut self.nbuf);
        nbuf.clear();
        map.neighbors_open(node.position, &mut nbuf);

        let mut discovered = 0;
        for &np in nbuf.iter() {
            if self.is_open(np) || self.is_closed(np) {
                continue;
            }
            let child = SearchNode::discover(map, np, node.distance_traveled + 1);
            self.push_open(child);
            self.predecessors.insert(np, node.position);
            discovered += 1;
        }
        self.nbuf = nbuf;
        trace!(
            "expanded {} (traveled {}, estimate {}): {} new",
            node.position, node.distance_traveled, node.distance_to_goal, discovered
        );

        let goal = map.end_tile();
        if node.position == goal {
            self.goal = Some(goal);
            self.set_status(SearchStatus::PathFound);
        }

        if let Some(i) = self.open.iter().position(|n| n.position == node.position) {
            self.open.remove(i);
        }
        self.open_set.remove(&node.position);
        self.closed.push(node);
        self.closed_set.insert(node.position);
    }

    fn push_open(&mut self, node: SearchNode) {
        self.open_set.insert(node.position);
        self.open.push(node);
    }

    fn set_status(&mut self, status: SearchStatus) {
        if self.status != status {
            debug!(
                "search {} -> {} after {} steps",
                self.status, status, self.total_steps
            );
            self.status = status;
        }
    }

    // -----------------------------------------------------------------------
    // Path reconstruction
    // -----------------------------------------------------------------------

    /// The tiles leading to the end tile.
    ///
    /// Returns `(false, [])` unless the path was found. Otherwise the
    /// positions run from the start tile up to, but not including, the end
    /// tile; when the end tile was itself the start the result is `[end]`.
    pub fn get_path(&self) -> (bool, Vec<Point>) {
        let (SearchStatus::PathFound, Some(goal)) = (self.status, self.goal) else {
            return (false, Vec::new());
        };
        let mut path = VecDeque::new();
        let mut cur = goal;
        while let Some(&prev) = self.predecessors.get(&cur) {
            path.push_front(prev);
            cur = prev;
        }
        if path.is_empty() {
            path.push_back(goal);
        }
        (true, path.into())
    }

    /// The full route from the start tile to the end tile, both included,
    /// or `None` if no path has been found.
    pub fn route(&self) -> Option<Vec<Point>> {
        let (found, mut path) = self.get_path();
        if !found {
            return None;
        }
        if let Some(goal) = self.goal.filter(|g| self.predecessors.contains_key(g)) {
            path.push(goal);
        }
        Some(path)
    }
}

impl<S: Strategy + Default> Default for PathFinder<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{AStar, BestFirst, BreadthFirst};
    use tilewalk_core::TileMap;

    fn finished<S: Strategy>(finder: &mut PathFinder<S>, map: &TileMap) -> SearchStatus {
        finder.start_search(map);
        finder.run(map, 1_000)
    }

    fn assert_connected(route: &[Point]) {
        for w in route.windows(2) {
            assert_eq!(w[0].manhattan(w[1]), 1, "gap between {} and {}", w[0], w[1]);
        }
    }

    #[test]
    fn breadth_first_three_by_three() {
        let map = TileMap::new(3, 3).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        assert_eq!(finished(&mut pf, &map), SearchStatus::PathFound);
        // every tile is expanded before the far corner
        assert_eq!(pf.total_steps(), 9);

        let (found, path) = pf.get_path();
        assert!(found);
        assert_eq!(
            path,
            vec![
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(0, 2),
                Point::new(1, 2),
            ]
        );
        let route = pf.route().unwrap();
        assert_eq!(route.len(), 5);
        assert_eq!(route.last(), Some(&Point::new(2, 2)));
        assert_connected(&route);
    }

    #[test]
    fn breadth_first_corridor_is_shortest() {
        let map = TileMap::parse(
            "S....E
             ######",
        )
        .unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        assert_eq!(finished(&mut pf, &map), SearchStatus::PathFound);
        let route = pf.route().unwrap();
        assert_eq!(route.len(), 6);
        assert_eq!(route[0], map.start_tile());
        assert_connected(&route);
    }

    #[test]
    fn breadth_first_finds_minimal_hops_around_walls() {
        let map = TileMap::parse(
            "S.#...
             .##.#.
             ....#E",
        )
        .unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        assert_eq!(finished(&mut pf, &map), SearchStatus::PathFound);
        let route = pf.route().unwrap();
        // S down to row 2, right to (3,2), up to (3,0), right to (5,0), down to E
        assert_eq!(route.len() - 1, 11);
        assert_connected(&route);
    }

    #[test]
    fn enclosed_start_has_no_path_on_first_step() {
        let map = TileMap::parse(
            "S#.
             #..
             ..E",
        )
        .unwrap();
        let mut pf = PathFinder::new(BestFirst);
        pf.start_search(&map);
        assert_eq!(pf.step(&map), SearchStatus::NoPath);
        assert_eq!(pf.total_steps(), 1);
        assert_eq!(pf.get_path(), (false, Vec::new()));
        assert!(pf.route().is_none());
    }

    #[test]
    fn unseeded_search_ends_with_no_path() {
        let map = TileMap::new(2, 2).unwrap();
        let mut pf = PathFinder::new(AStar);
        pf.set_searching(true);
        assert_eq!(pf.step(&map), SearchStatus::NoPath);
        assert_eq!(pf.total_steps(), 1);
    }

    #[test]
    fn unreachable_goal_exhausts_frontier() {
        let map = TileMap::parse(
            "S.#.
             ..#E",
        )
        .unwrap();
        for method in SearchMethod::ALL {
            let mut pf = PathFinder::new(method);
            assert_eq!(finished(&mut pf, &map), SearchStatus::NoPath, "{method}");
            assert_eq!(pf.closed_list().len(), 4);
            assert!(pf.open_list().is_empty());
        }
    }

    #[test]
    fn every_method_reaches_the_goal() {
        let map = TileMap::parse(
            "S..3....
             .##3###.
             .#.5..#.
             .#.##.#.
             ...9..#E",
        )
        .unwrap();
        for method in SearchMethod::ALL {
            let mut pf = PathFinder::new(method);
            assert_eq!(finished(&mut pf, &map), SearchStatus::PathFound, "{method}");
            let route = pf.route().unwrap();
            assert_eq!(route.first(), Some(&map.start_tile()));
            assert_eq!(route.last(), Some(&map.end_tile()));
            assert_connected(&route);
            assert!(route.iter().all(|&p| map.is_open(p)));
        }
    }

    #[test]
    fn start_on_goal() {
        let mut map = TileMap::new(3, 3).unwrap();
        map.set_end_tile(Point::ZERO).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        pf.start_search(&map);
        assert_eq!(pf.step(&map), SearchStatus::PathFound);
        assert_eq!(pf.get_path(), (true, vec![Point::ZERO]));
        assert_eq!(pf.route(), Some(vec![Point::ZERO]));
    }

    #[test]
    fn advance_is_time_gated() {
        let map = TileMap::new(4, 4).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        assert_eq!(pf.step_interval(), Duration::from_secs(5));

        // stopped: nothing happens
        pf.advance(&map, Duration::from_secs(60));
        assert_eq!(pf.total_steps(), 0);

        pf.start_search(&map);
        pf.advance(&map, Duration::from_secs(2));
        pf.advance(&map, Duration::from_secs(2));
        assert_eq!(pf.total_steps(), 0);
        pf.advance(&map, Duration::from_secs(1));
        assert_eq!(pf.total_steps(), 1);

        // no catch-up
        pf.advance(&map, Duration::from_secs(100));
        assert_eq!(pf.total_steps(), 2);
        pf.advance(&map, Duration::from_secs(4));
        assert_eq!(pf.total_steps(), 2);
    }

    #[test]
    fn advance_waits_for_a_seeded_open_list() {
        let map = TileMap::new(2, 2).unwrap();
        let mut pf = PathFinder::with_config(
            BestFirst,
            SearchConfig {
                step_interval: Duration::from_millis(10),
            },
        );
        pf.set_searching(true);
        pf.advance(&map, Duration::from_millis(10));
        pf.advance(&map, Duration::from_millis(50));
        assert_eq!(pf.status(), SearchStatus::Searching);
        assert_eq!(pf.total_steps(), 0);

        // the time piled up while unseeded is spent on the first step
        pf.seed(SearchNode::discover(&map, map.start_tile(), 0));
        pf.advance(&map, Duration::ZERO);
        assert_eq!(pf.total_steps(), 1);
        pf.advance(&map, Duration::from_millis(5));
        assert_eq!(pf.total_steps(), 1);
    }

    #[test]
    fn advance_counts_the_step_that_ends_the_search() {
        let map = TileMap::parse("S#\n#E").unwrap();
        let mut pf = PathFinder::with_config(
            BestFirst,
            SearchConfig {
                step_interval: Duration::from_millis(10),
            },
        );
        pf.start_search(&map);
        pf.advance(&map, Duration::from_millis(10));
        assert_eq!(pf.status(), SearchStatus::NoPath);
        assert_eq!(pf.total_steps(), 1);
        pf.advance(&map, Duration::from_millis(10));
        assert_eq!(pf.total_steps(), 1);
    }

    #[test]
    fn halting_preserves_state() {
        let map = TileMap::new(5, 5).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        pf.set_step_interval(Duration::from_secs(1));
        pf.start_search(&map);
        for _ in 0..3 {
            pf.advance(&map, Duration::from_secs(1));
        }
        pf.set_searching(false);
        assert_eq!(pf.status(), SearchStatus::Stopped);
        let open = pf.open_list().to_vec();
        let closed = pf.closed_list().len();

        pf.advance(&map, Duration::from_secs(10));
        assert_eq!(pf.step(&map), SearchStatus::Stopped);
        assert_eq!(pf.total_steps(), 3);
        assert_eq!(pf.open_list(), open.as_slice());
        assert_eq!(pf.closed_list().len(), closed);

        pf.set_searching(true);
        assert_eq!(pf.run(&map, 1_000), SearchStatus::PathFound);
    }

    #[test]
    fn halting_keeps_terminal_status() {
        let map = TileMap::new(1, 1).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        pf.start_search(&map);
        pf.step(&map);
        pf.set_searching(false);
        assert_eq!(pf.status(), SearchStatus::PathFound);
    }

    #[test]
    fn reset_forgets_the_path() {
        let map = TileMap::new(3, 3).unwrap();
        let mut pf = PathFinder::new(AStar);
        assert_eq!(finished(&mut pf, &map), SearchStatus::PathFound);
        let steps = pf.total_steps();

        pf.reset();
        assert_eq!(pf.get_path(), (false, Vec::new()));
        assert!(pf.open_list().is_empty());
        assert!(pf.closed_list().is_empty());
        assert_eq!(pf.predecessor(Point::new(2, 2)), None);
        assert_eq!(pf.total_steps(), steps);
        assert_eq!(pf.status(), SearchStatus::PathFound);
    }

    #[test]
    fn reset_restarts_the_step_timer() {
        let map = TileMap::new(3, 3).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        pf.start_search(&map);
        pf.advance(&map, Duration::from_secs(4));
        pf.reset();
        pf.seed(SearchNode::discover(&map, map.start_tile(), 0));
        pf.advance(&map, Duration::from_secs(4));
        assert_eq!(pf.total_steps(), 0);
    }

    #[test]
    fn open_and_closed_stay_disjoint() {
        let map = TileMap::parse(
            "S.1.2.
             .#3#..
             ..4..#
             #.#.9E",
        )
        .unwrap();
        for method in SearchMethod::ALL {
            let mut pf = PathFinder::new(method);
            pf.start_search(&map);
            while pf.is_searching() {
                pf.step(&map);
                for n in pf.open_list() {
                    assert!(!pf.is_closed(n.position), "{method}: {} in both", n.position);
                }
                assert_eq!(pf.open_list().len(), pf.open_set.len());
                assert_eq!(pf.closed_list().len(), pf.closed_set.len());
            }
        }
    }

    #[test]
    fn predecessors_point_at_expanded_neighbours() {
        let map = TileMap::parse(
            "S..
             .#.
             ..E",
        )
        .unwrap();
        let mut pf = PathFinder::new(BestFirst);
        finished(&mut pf, &map);
        for (p, _) in map.iter() {
            if let Some(prev) = pf.predecessor(p) {
                assert!(pf.is_closed(prev));
                assert_eq!(p.manhattan(prev), 1);
            }
        }
        assert_eq!(pf.predecessor(map.start_tile()), None);
    }

    #[test]
    fn first_discovery_wins() {
        // (1,1) is reached from (0,1) first and keeps that link, although
        // (1,0) also borders it.
        let map = TileMap::parse(
            "S.9
             ...
             ..E",
        )
        .unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        finished(&mut pf, &map);
        let seen = pf
            .closed_list()
            .iter()
            .filter(|n| n.position == Point::new(1, 1))
            .count();
        assert_eq!(seen, 1);
        assert_eq!(pf.predecessor(Point::new(1, 1)), Some(Point::new(0, 1)));
    }

    #[test]
    fn neighbours_are_discovered_up_down_right_left() {
        let map = TileMap::new(3, 3).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        pf.seed(SearchNode::discover(&map, Point::new(1, 1), 0));
        pf.set_searching(true);
        pf.step(&map);
        let open: Vec<_> = pf.open_list().iter().map(|n| n.position).collect();
        assert_eq!(
            open,
            vec![
                Point::new(1, 0),
                Point::new(1, 2),
                Point::new(2, 1),
                Point::new(0, 1),
            ]
        );
        assert!(pf.open_list().iter().all(|n| n.distance_traveled == 1));
    }

    #[test]
    fn seed_rejects_known_tiles() {
        let map = TileMap::new(2, 1).unwrap();
        let mut pf = PathFinder::new(BreadthFirst);
        let start = SearchNode::discover(&map, Point::ZERO, 0);
        assert!(pf.seed(start));
        assert!(!pf.seed(start));
        pf.set_searching(true);
        pf.step(&map);
        assert!(!pf.seed(start));
    }

    #[test]
    fn astar_step_may_expand_several_nodes() {
        let map = TileMap::parse(
            "S....
             9....
             ....E",
        )
        .unwrap();
        let mut pf = PathFinder::new(AStar);
        pf.start_search(&map);
        pf.step(&map);
        // open is now [(0,1) cost 5, (1,0) cost 1]: the first is taken
        // unconditionally, the second improves on it
        pf.step(&map);
        assert_eq!(pf.total_steps(), 2);
        let closed: Vec<_> = pf.closed_list().iter().map(|n| n.position).collect();
        assert_eq!(closed, vec![Point::ZERO, Point::new(0, 1), Point::new(1, 0)]);
        assert_eq!(pf.status(), SearchStatus::Searching);
    }

    #[test]
    fn start_off_the_map() {
        let map = TileMap::new(2, 2).unwrap();
        let mut pf: PathFinder = PathFinder::default();
        struct Shifted<'a>(&'a TileMap);
        impl TileSource for Shifted<'_> {
            fn contains(&self, p: Point) -> bool {
                TileSource::contains(self.0, p)
            }
            fn weight(&self, p: Point) -> f32 {
                TileSource::weight(self.0, p)
            }
            fn neighbors_open(&self, p: Point, buf: &mut Vec<Point>) {
                self.0.neighbors_open(p, buf)
            }
            fn start_tile(&self) -> Point {
                Point::new(-3, 0)
            }
            fn end_tile(&self) -> Point {
                self.0.end_tile()
            }
        }
        pf.start_search(&Shifted(&map));
        assert_eq!(pf.status(), SearchStatus::NoPath);
        assert!(pf.open_list().is_empty());
    }
}
