use anyhow::{anyhow, Context, Result};
use clap::Parser;
use generalized_pathfinding::{create_path_finder, Algorithm, GraphSource, LoggingConfig, PathFinderOptions};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "route")]
#[command(about = "Find a shortest path in a JSON graph document", long_about = None)]
struct Args {
    /// JSON graph document
    #[arg(short, long)]
    graph: PathBuf,

    /// Source node id
    #[arg(short, long)]
    from: String,

    /// Destination node id
    #[arg(short, long)]
    to: String,

    /// Algorithm: astar, ch or auto
    #[arg(short, long, default_value = "auto")]
    algorithm: Algorithm,

    /// Directory for hierarchy artifacts (defaults to the graph's directory)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Scaling factor for integer weights
    #[arg(long)]
    scaling_factor: Option<u32>,

    /// Node count from which auto prefers the contraction hierarchy
    #[arg(long)]
    auto_threshold: Option<usize>,

    /// Log format: pretty or json
    #[arg(long)]
    log_format: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(format) = args.log_format.clone() {
        logging.format = format;
    }
    logging.init().context("Failed to initialize logging")?;

    let mut options = PathFinderOptions::from_env().context("Invalid GPF_* environment")?;
    if let Some(dir) = args.cache_dir.clone() {
        options.cache_dir = Some(dir);
    }
    if let Some(scaling_factor) = args.scaling_factor {
        options.scaling_factor = scaling_factor;
    }
    if let Some(threshold) = args.auto_threshold {
        options.auto_thresholds = vec![
            (0, generalized_pathfinding::EngineKind::AStar),
            (threshold, generalized_pathfinding::EngineKind::GraphHierarchy),
        ];
    }

    let source = GraphSource::from_json_file(&args.graph);
    let start = Instant::now();
    let finder = create_path_finder(&source, args.algorithm, &options)
        .with_context(|| format!("Failed to prepare path finder for {}", args.graph.display()))?;
    let prepared = start.elapsed();

    let graph_finder = finder
        .as_graph_finder()
        .ok_or_else(|| anyhow!("{} does not answer queries on node ids", finder.kind()))?;

    let start = Instant::now();
    let path = graph_finder
        .find_shortest_path(&args.from, &args.to)
        .context("Query failed")?;
    let queried = start.elapsed();

    eprintln!(
        "engine: {}, prepare: {:.2?}, query: {:.2?}",
        finder.kind(),
        prepared,
        queried
    );
    println!("{}", serde_json::to_string_pretty(&path)?);
    Ok(())
}
