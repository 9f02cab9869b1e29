//! Road map builder.
//!
//! Loads a polygon world, loads or extracts its road map, writes the road map
//! file and optionally an SVG snapshot and graph metrics.
//!
//! Usage:
//!   anveshan-roadmap --map maps/two_rooms.yaml
//!   anveshan-roadmap --map maps/two_rooms.yaml --output two_rooms.roadmap --svg two_rooms.svg --stats

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use anveshan::analysis::{DEFAULT_MAX_CYCLES, GraphProperties};
use anveshan::io::{RoadMapStore, save_svg};
use anveshan::world::{PolygonMap, Walkable};
use anveshan::{AnveshanConfig, AnveshanError, Layer, RoadGraph, SkeletonExtractor};

/// Build and inspect road maps
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Polygon world description (YAML)
    #[arg(short, long)]
    map: PathBuf,

    /// Configuration file path (defaults to configs/anveshan.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Road map file (defaults to persistence.roadmap_path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ignore any existing road map file and extract a fresh one
    #[arg(long)]
    regenerate: bool,

    /// Write an SVG snapshot of the divided layer
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print graph metrics
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anveshan::Result<()> {
    let config = match &args.config {
        Some(path) => AnveshanConfig::load(path)?,
        None => AnveshanConfig::load_default()?,
    };
    let world = PolygonMap::load(&args.map)?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.persistence.roadmap_path());
    let store = RoadMapStore::new(path);

    let road_map = if args.regenerate {
        let map = SkeletonExtractor::new(config.to_skeleton_config()).extract(&world);
        store.save(&map)?;
        map
    } else if config.persistence.regenerate_on_error {
        store.load_or_extract(&world, &config.skeleton)
    } else {
        store.load()?
    };
    if road_map.is_empty() {
        return Err(AnveshanError::EmptyGraph);
    }
    info!(
        "[RoadMap] {} nodes, {} edges at {}",
        road_map.node_count(),
        road_map.edge_count(),
        store.path().display()
    );

    let graph = RoadGraph::from_road_map(&road_map, config.to_road_graph_config());

    if let Some(svg_path) = &args.svg {
        save_svg(&graph.snapshot(Layer::Divided), &world.wall_polygons(), svg_path)?;
        info!("[RoadMap] Wrote snapshot to {}", svg_path.display());
    }

    if args.stats {
        let props = GraphProperties::analyze(graph.original(), DEFAULT_MAX_CYCLES);
        println!("Nodes:         {}", props.node_count);
        println!("Edges:         {}", props.edge_count);
        println!("Total length:  {:.2}", props.total_length);
        println!("Radius:        {:.2}", props.radius);
        println!("Diameter:      {:.2}", props.diameter);
        println!(
            "Cycles:        {}{}",
            props.cycles.len(),
            if props.cycles_truncated { "+" } else { "" }
        );
        if let (Some(girth), Some(circumference)) = (props.girth, props.circumference) {
            println!("Girth:         {}", girth);
            println!("Circumference: {}", circumference);
        }
    }

    Ok(())
}
