use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use lloyd::log_json;
use lloyd::utilities::backend::BackendKind;
use lloyd::utilities::driver::{KmeansOptions, kmeans};
use lloyd::utilities::parse::{read_points, write_assignments, write_points};
use lloyd::utilities::reduce::EmptyClusterPolicy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lloyd")]
#[command(about = "Partition 2-D points into K clusters with Lloyd's algorithm")]
struct Args {
    /// Initial centroids (u32 count + f32 pairs)
    centroid_file: PathBuf,

    /// Data points (u32 count + f32 pairs)
    data_file: PathBuf,

    /// Where to write the per-point cluster indices
    assignment_output: PathBuf,

    /// Where to write the final centroids
    centroid_output: Option<PathBuf>,

    /// Fixed number of iterations [default: 1024]
    iteration_count: Option<usize>,

    #[arg(long)]
    backend: Option<BackendKind>,

    /// Threads or ranks; 0 uses every core
    #[arg(long)]
    workers: Option<usize>,

    #[arg(long)]
    empty_cluster: Option<EmptyClusterPolicy>,

    /// JSON file with KmeansOptions; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON run summary to stderr
    #[arg(long)]
    summary: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn load_options(args: &Args) -> anyhow::Result<KmeansOptions> {
    let mut opts = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("File open error {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => KmeansOptions::default(),
    };
    if let Some(n) = args.iteration_count {
        opts.iterations = n;
    }
    if let Some(b) = args.backend {
        opts.backend = b;
    }
    if let Some(w) = args.workers {
        opts.workers = w;
    }
    if let Some(p) = args.empty_cluster {
        opts.empty_cluster = p;
    }
    Ok(opts)
}

fn run(args: Args) -> anyhow::Result<()> {
    let opts = load_options(&args)?;
    let centroids = read_points(&args.centroid_file)
        .with_context(|| format!("reading {}", args.centroid_file.display()))?;
    let data = read_points(&args.data_file)
        .with_context(|| format!("reading {}", args.data_file.display()))?;

    let start = Instant::now();
    let out = kmeans(&data, centroids, &opts)?;
    let spent = start.elapsed();
    println!("Time spent: {}.{:09}", spent.as_secs(), spent.subsec_nanos());

    write_assignments(&args.assignment_output, &out.table)?;
    if let Some(path) = &args.centroid_output {
        write_points(path, &out.centroids)?;
    }
    if args.summary {
        log_json(&serde_json::json!({
            "backend": out.backend,
            "iterations": out.iterations,
            "points": out.table.len(),
            "clusters": out.centroids.len(),
            "empty_events": out.empty_events,
            "seconds": spent.as_secs_f64(),
        }));
    }
    Ok(())
}
