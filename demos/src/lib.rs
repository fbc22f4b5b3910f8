//! Shared pieces of the `tilewalk` command-line runner: random map
//! generation, a simulated clock driving the search, and ASCII output.

use std::fmt;
use std::time::Duration;

use log::info;
use rand::{Rng, RngExt};
use thiserror::Error;
use tilewalk_core::{CLOSED, MapError, OPEN, Point, TileMap};
use tilewalk_search::{PathFinder, SearchConfig, SearchMethod, SearchStatus, UnknownMethod};

/// Errors the runner reports before exiting.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("reading map file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Method(#[from] UnknownMethod),
}

// ---------------------------------------------------------------------------
// Map generation
// ---------------------------------------------------------------------------

/// Build a random map.
///
/// Each tile is closed with probability `wall_density`; the others get a
/// weight between 0.0 and 0.9 in steps of 0.1. The start tile lies in the
/// left half and the end tile in the right half, both forced open.
pub fn random_map<R: Rng>(
    columns: i32,
    rows: i32,
    wall_density: f64,
    rng: &mut R,
) -> Result<TileMap, MapError> {
    let mut map = TileMap::new(columns, rows)?;
    for id in 0..map.len() {
        let weight = if rng.random_range(0.0..1.0) < wall_density {
            CLOSED
        } else {
            rng.random_range(0..10u32) as f32 / 10.0
        };
        map.set_tile_weight(id, weight)?;
    }

    let half = (columns / 2).max(1);
    let start = Point::new(rng.random_range(0..half), rng.random_range(0..rows));
    let end = Point::new(
        rng.random_range((columns - half).min(columns - 1)..columns),
        rng.random_range(0..rows),
    );
    map.set_start_tile(start)?;
    map.set_end_tile(end)?;
    map.set_weight(start, OPEN)?;
    map.set_weight(end, OPEN)?;
    Ok(map)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Result of driving one search to the end.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub method: SearchMethod,
    pub status: SearchStatus,
    pub steps: u64,
    pub expanded: usize,
    /// Simulated time fed to the engine.
    pub elapsed: Duration,
    pub route: Option<Vec<Point>>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<14} {:<11} steps {:>5}  expanded {:>5}  simulated {:>8.1?}",
            self.method.to_string(),
            self.status.to_string(),
            self.steps,
            self.expanded,
            self.elapsed
        )?;
        if let Some(route) = &self.route {
            write!(f, "  route {} hops", route.len().saturating_sub(1))?;
        }
        Ok(())
    }
}

/// Run `method` over `map`, advancing a simulated clock by `tick` until the
/// search ends or `max_ticks` ticks have passed.
pub fn simulate(
    map: &TileMap,
    method: SearchMethod,
    config: SearchConfig,
    tick: Duration,
    max_ticks: u64,
) -> Outcome {
    let mut finder = PathFinder::with_config(method, config);
    finder.start_search(map);

    let mut elapsed = Duration::ZERO;
    for _ in 0..max_ticks {
        if !finder.is_searching() {
            break;
        }
        finder.advance(map, tick);
        elapsed += tick;
    }
    if finder.is_searching() {
        info!("{method}: gave up after {max_ticks} ticks");
        finder.set_searching(false);
    }

    Outcome {
        method,
        status: finder.status(),
        steps: finder.total_steps(),
        expanded: finder.closed_list().len(),
        elapsed,
        route: finder.route(),
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The map in ASCII notation with `route` drawn as `*` between the
/// endpoints.
pub fn render(map: &TileMap, route: Option<&[Point]>) -> String {
    let mut rows: Vec<Vec<char>> = map.to_string().lines().map(|l| l.chars().collect()).collect();
    for &p in route.unwrap_or_default() {
        if p == map.start_tile() || p == map.end_tile() {
            continue;
        }
        if let Some(ch) = rows
            .get_mut(p.y as usize)
            .and_then(|row| row.get_mut(p.x as usize))
        {
            *ch = '*';
        }
    }
    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
