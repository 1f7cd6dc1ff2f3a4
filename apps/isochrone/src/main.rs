//! `isochrone` — compute travel-time isochrones for a set of origins.
//!
//! Reads a TOML run configuration (see `IsochroneConfig`), loads the network
//! and delay sources it names, builds one session, and writes one GeoJSON
//! feature per origin and cutoff.
//!
//! Run with:
//!   cargo run -p isochrone --release -- --config runs/schools_walk.toml
//!
//! Relative paths inside the config are resolved against the config file's
//! directory.  Set `RUST_LOG=debug` for loader and injection detail.

mod pipeline;


use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use iso_core::TravelMode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run configuration (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured travel mode (`drive` or `walk`).
    #[arg(long)]
    mode: Option<TravelMode>,

    /// Override the configured cutoffs, in seconds (comma-separated).
    #[arg(long = "cutoff", value_delimiter = ',')]
    cutoffs: Vec<f64>,

    /// Override the isochrone GeoJSON output path.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = pipeline::load_config(&args.config)?;
    pipeline::apply_overrides(&mut config, args.mode, args.cutoffs, args.output)?;

    println!("=== isochrone — {} ===", config.mode);

    let t0 = Instant::now();
    let summary = pipeline::run(&config)?;
    let elapsed = t0.elapsed();

    println!("Completed in {:.3} s", elapsed.as_secs_f64());
    println!(
        "  network            : {} nodes, {} edges",
        summary.nodes, summary.edges
    );
    println!("  signal sites       : {}", summary.site_nodes);
    println!("  origins            : {}", summary.origins);
    println!(
        "  isochrones         : {} ({} without a polygon)",
        summary.rows, summary.empty_polygons
    );
    println!("  written to         : {}", config.outputs.isochrones.display());
    if let Some(path) = &config.outputs.site_mapping {
        println!("  site mapping       : {}", path.display());
    }

    Ok(())
}
