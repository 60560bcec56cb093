use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use generalized_pathfinding::source::{JsonEdge, JsonGraphDocument, JsonNode};
use generalized_pathfinding::Vda5050Position;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
enum GraphType {
    Grid,
    Uniform,
}

#[derive(Parser, Debug)]
#[command(name = "graph_generator")]
#[command(about = "Generate weighted multigraphs as JSON graph documents", long_about = None)]
struct Args {
    /// Type of graph to generate
    #[arg(short, long, value_enum)]
    graph_type: GraphType,

    /// Number of nodes (uniform graphs)
    #[arg(short = 'n', long, default_value_t = 1000)]
    nodes: usize,

    /// Average out-degree (uniform graphs)
    #[arg(short = 'd', long, default_value_t = 4)]
    avg_degree: usize,

    /// Grid size, creates a size×size grid
    #[arg(short = 's', long, default_value_t = 32)]
    size: usize,

    /// Probability of adding a parallel edge next to each generated edge
    #[arg(long, default_value_t = 0.1)]
    parallel: f64,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

struct GraphGenerator {
    rng: StdRng,
    parallel: f64,
}

impl GraphGenerator {
    fn new(seed: u64, parallel: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            parallel,
        }
    }

    /// Push an edge and, with probability `parallel`, a slower or faster twin
    fn push_edge(&mut self, edges: &mut Vec<JsonEdge>, source: usize, target: usize, weight: f64) {
        edges.push(JsonEdge {
            source: source.to_string(),
            target: target.to_string(),
            key: None,
            weight,
        });
        if self.rng.gen_bool(self.parallel) {
            let twin = weight * self.rng.gen_range(0.8..1.5);
            edges.push(JsonEdge {
                source: source.to_string(),
                target: target.to_string(),
                key: Some(format!("{} -> {} (alt)", source, target)),
                // grid steps are 1.0 apart, keep the heuristic admissible
                weight: twin.max(1.0),
            });
        }
    }

    /// Bidirectional grid; weights never undercut the euclidean distance
    fn generate_grid(&mut self, size: usize) -> JsonGraphDocument {
        println!("Generating {}x{} grid...", size, size);

        let id = |x: usize, y: usize| y * size + x;
        let nodes = (0..size * size)
            .map(|i| JsonNode {
                id: i.to_string(),
                position: Some(Vda5050Position::new((i % size) as f64, (i / size) as f64, "grid")),
            })
            .collect();

        let mut edges = Vec::new();
        for y in 0..size {
            for x in 0..size {
                let neighbours = [(x + 1, y), (x, y + 1)];
                for (nx, ny) in neighbours {
                    if nx >= size || ny >= size {
                        continue;
                    }
                    let forward = self.rng.gen_range(1.0..3.0);
                    let backward = self.rng.gen_range(1.0..3.0);
                    self.push_edge(&mut edges, id(x, y), id(nx, ny), forward);
                    self.push_edge(&mut edges, id(nx, ny), id(x, y), backward);
                }
            }
        }

        println!("Generated {} edges", edges.len());
        JsonGraphDocument {
            nodes,
            edges,
            heuristic_divisor: 1.0,
        }
    }

    /// Random directed multigraph with a fixed average out-degree
    fn generate_uniform(&mut self, n: usize, avg_degree: usize) -> JsonGraphDocument {
        println!("Generating uniform random graph with {} nodes, avg degree {}...", n, avg_degree);

        let nodes = (0..n)
            .map(|i| JsonNode {
                id: i.to_string(),
                position: None,
            })
            .collect();

        let mut edges = Vec::new();
        for _ in 0..n * avg_degree {
            let source = self.rng.gen_range(0..n);
            let target = self.rng.gen_range(0..n);
            if source != target {
                let weight = self.rng.gen_range(1.0..10.0);
                self.push_edge(&mut edges, source, target, weight);
            }
        }

        println!("Generated {} edges", edges.len());
        JsonGraphDocument {
            nodes,
            edges,
            heuristic_divisor: 1.0,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.parallel) {
        bail!("--parallel must be within [0, 1], got {}", args.parallel);
    }

    let mut generator = GraphGenerator::new(args.seed, args.parallel);
    let document = match args.graph_type {
        GraphType::Grid => generator.generate_grid(args.size),
        GraphType::Uniform => {
            if args.nodes < 2 {
                bail!("uniform graphs need at least 2 nodes");
            }
            generator.generate_uniform(args.nodes, args.avg_degree)
        }
    };

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &document).context("Failed to write graph document")?;
    writer.flush()?;

    println!("✓ Wrote {}", args.output.display());
    Ok(())
}
