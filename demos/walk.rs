//! Run tile map searches on a simulated clock and print the results.
//!
//! Run: cargo run --bin tilewalk -- --method astar --seed 7
//! Set `RUST_LOG=tilewalk_search=trace` to watch every expansion.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::info;
use rand::{RngExt, SeedableRng};
use tilewalk_core::TileMap;
use tilewalk_demos::{DemoError, random_map, render, simulate};
use tilewalk_search::{SearchConfig, SearchMethod};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Config {
    #[arg(long, default_value_t = 24)]
    columns: i32,

    #[arg(long, default_value_t = 12)]
    rows: i32,

    /// Share of tiles generated as walls.
    #[arg(long, default_value_t = 0.25)]
    wall_density: f64,

    /// Seed for map generation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// breadth-first, best-first, astar, or all.
    #[arg(long, default_value = "all")]
    method: String,

    /// Read the map from an ASCII file instead of generating one.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Simulated time per tick, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// Simulated time between search steps, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    step_interval_ms: u64,

    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,

    /// Print only the result lines.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn load_map(config: &Config) -> Result<TileMap, DemoError> {
    if let Some(path) = &config.map {
        let text = std::fs::read_to_string(path)?;
        return Ok(TileMap::parse(&text)?);
    }
    let seed = config
        .seed
        .unwrap_or_else(|| rand::rng().random_range(0..u64::MAX));
    info!("generating {}x{} map with seed {seed}", config.columns, config.rows);
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    Ok(random_map(
        config.columns,
        config.rows,
        config.wall_density,
        &mut rng,
    )?)
}

fn methods(config: &Config) -> Result<Vec<SearchMethod>, DemoError> {
    if config.method.eq_ignore_ascii_case("all") {
        return Ok(SearchMethod::ALL.to_vec());
    }
    Ok(vec![config.method.parse()?])
}

fn run(config: &Config) -> Result<(), DemoError> {
    let map = load_map(config)?;
    let search = SearchConfig {
        step_interval: Duration::from_millis(config.step_interval_ms),
    };
    let tick = Duration::from_millis(config.tick_ms);

    if !config.quiet {
        println!("{map}\n");
        println!("start {}  end {}\n", map.start_tile(), map.end_tile());
    }
    for method in methods(config)? {
        let outcome = simulate(&map, method, search, tick, config.max_ticks);
        println!("{outcome}");
        if !config.quiet && outcome.route.is_some() {
            println!("{}\n", render(&map, outcome.route.as_deref()));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let config = Config::parse();

    if let Err(e) = run(&config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
