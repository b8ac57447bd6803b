use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lloyd::utilities::generate::{blob_points, uniform_points};
use lloyd::utilities::parse::write_points;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Parser)]
#[command(name = "lloyd-gen")]
#[command(about = "Generate centroid and data files for lloyd")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Seed for reproducible output; random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Uniform points in [0, 100)²
    Centroid { size: usize, output: PathBuf },
    /// Gaussian blobs
    Data {
        size: usize,
        output: PathBuf,
        clusters: usize,
    },
}

fn main() {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    if let Err(e) = run(args) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let (points, output) = match args.mode {
        Mode::Centroid { size, output } => (uniform_points(&mut rng, size), output),
        Mode::Data {
            size,
            output,
            clusters,
        } => (blob_points(&mut rng, size, clusters)?, output),
    };
    write_points(&output, &points).with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}
