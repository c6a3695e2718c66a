//! corridor: end-to-end demo of the roadline engine.
//!
//! Loads a road network (a GeoJSON file, or a small synthetic town), routes
//! between two points on the background worker, then checks the route and a
//! hand-drawn straight line against the roads in both conformance modes.
//!
//! ```text
//! corridor --from 0,0 --to 900,600
//! corridor --roads roads.geojson --config engine.json --from 1200,40 --to 5600,3100
//! ```

mod network;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use rl_core::geo::polyline_length;
use rl_core::{ConformanceMode, Coord, EngineConfig, LayerFilter, RoadFeature};
use rl_worker::{Job, Outcome, RouteWorker, Ticket};

use network::build_roads;

#[derive(Parser)]
#[command(name = "corridor")]
#[command(about = "Route between two points along the road network and check line conformance")]
struct Cli {
    /// GeoJSON road file.  Uses a built-in synthetic town when omitted.
    #[arg(long)]
    roads: Option<PathBuf>,

    /// JSON engine configuration; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start point as `x,y`.
    #[arg(long, value_parser = parse_coord, default_value = "-250,610")]
    from: Coord,

    /// End point as `x,y`.
    #[arg(long, value_parser = parse_coord, default_value = "890,5")]
    to: Coord,

    /// Hide national roads.
    #[arg(long)]
    no_national: bool,

    /// Hide departmental roads.
    #[arg(long)]
    no_departmental: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

fn parse_coord(s: &str) -> Result<Coord, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected `x,y`, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    Ok(Coord::new(parse(x)?, parse(y)?))
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn load_roads(path: Option<&PathBuf>) -> Result<Vec<RoadFeature>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading roads {}", path.display()))?;
            Ok(rl_graph::import::features_from_geojson_str(&text)?)
        }
        None => Ok(build_roads()),
    }
}

/// Wait for `ticket`, printing the progress events tagged with its id.
fn wait_verbose(worker: &RouteWorker, ticket: Ticket) -> Result<Outcome> {
    let id = ticket.id();
    let outcome = ticket.wait()?;
    for p in worker.progress().try_iter().filter(|p| p.id == id) {
        println!("    {} {}", p.id, p.event);
    }
    Ok(outcome)
}

fn print_validation(label: &str, outcome: Outcome) {
    match outcome {
        Outcome::Validation(r) if r.is_valid => println!("  {label:<22} valid"),
        Outcome::Validation(r) => match r.rejection {
            Some(reason) => println!("  {label:<22} rejected ({reason:?})"),
            None => println!(
                "  {label:<22} INVALID  points {:?}  segments {:?}",
                r.invalid_points, r.invalid_segments
            ),
        },
        other => println!("  {label:<22} unexpected answer {other:?}"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    println!("=== corridor: roadline routing & conformance ===");

    let config = load_config(cli.config.as_ref())?;
    let roads = load_roads(cli.roads.as_ref())?;
    let filter = LayerFilter { national: !cli.no_national, departmental: !cli.no_departmental };
    if filter.is_empty() {
        bail!("every road layer is hidden; drop --no-national or --no-departmental");
    }
    info!(features = roads.len(), ?filter, "roads loaded");

    let worker = RouteWorker::spawn(config)?;

    // 1. Build the graph and segment index.
    let t0 = Instant::now();
    match wait_verbose(&worker, worker.submit(Job::LoadRoads { features: roads, filter }))? {
        Outcome::Loaded { nodes, edges, segments } => println!(
            "Road graph: {nodes} nodes, {edges} edges, {segments} indexed segments ({:.1} ms)",
            t0.elapsed().as_secs_f64() * 1e3
        ),
        Outcome::LoadFailed(e) => bail!("road load failed: {e}"),
        other => bail!("unexpected answer to road load: {other:?}"),
    }
    println!();

    // 2. Stop placement.
    for (name, point) in [("from", cli.from), ("to", cli.to)] {
        if let Outcome::Point(check) = worker.submit(Job::CheckPoint { point }).wait()? {
            let dist = check
                .nearest_distance
                .map_or_else(|| "no roads".to_string(), |d| format!("{d:.1} m from road"));
            let verdict = if check.on_road { "ok" } else { "too far" };
            println!("Stop {name:<4} {point}  {dist}  [{verdict}]");
        }
    }
    println!();

    // 3. Shortest road path.
    let route = worker.submit(Job::ShortestPath { start: cli.from, end: cli.to });
    let route_id = route.id();
    let path = match wait_verbose(&worker, route)? {
        Outcome::Path(p) => p,
        Outcome::NoPath(e) => {
            println!("No route ({:?}): {e}", e.kind());
            return Ok(());
        }
        Outcome::Cancelled => {
            println!("Route {route_id} was superseded");
            return Ok(());
        }
        other => bail!("unexpected answer to route query: {other:?}"),
    };
    println!(
        "Route {route_id}: {:.1} m over {} nodes, straight line {:.1} m (snapped {:.1} m / {:.1} m)",
        path.distance,
        path.node_count(),
        polyline_length(&[cli.from, cli.to]),
        path.start.distance,
        path.end.distance
    );
    for c in &path.coords {
        println!("    {c}");
    }
    println!();

    // 4. Conformance of the routed line and of a naive straight line.
    println!("Conformance:");
    let straight = vec![cli.from, cli.to];
    for mode in [ConformanceMode::Construction, ConformanceMode::Final] {
        let routed = worker.submit(Job::Validate { candidate: path.coords.clone(), mode });
        print_validation(&format!("routed ({mode:?})"), routed.wait()?);
        let drawn = worker.submit(Job::Validate { candidate: straight.clone(), mode });
        print_validation(&format!("straight ({mode:?})"), drawn.wait()?);
    }

    Ok(())
}
