#![deny(
    // Overly strict on purpose: a quality seal that forces inline allows at the
    // places where we consciously deviate, so a reviewer knows where to look.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]
//! scig-gen command-line interface.
//!
//! Generates one synthetic supply-chain instance per invocation: a BOM DAG
//! with depth/longest-path analysis, a facility network sampled inside
//! permitted regions, and the derived item-facility tables. All artifacts
//! are written to a timestamped directory under `runs/`. See `--help` for
//! the full parameter surface.

use std::path::PathBuf;

use anyhow::{
    ensure,
    Context,
    Result,
};
use clap::Parser;
use scig_core::regions::{
    RegionSet,
    DEFAULT_REGION_CODES,
};
use scig_gen::assemble::AssemblyParams;
use scig_gen::bom::BomParams;
use scig_gen::generation::{
    self,
    GenerationConfig,
};
use scig_gen::siting::{
    SitingParams,
    DEFAULT_MAX_ATTEMPTS,
};
use tracing::info;

/// Generate synthetic multi-echelon supply-chain instances: a random BOM
/// dependency graph plus a geographically sampled facility network and the
/// derived sourcing/processing/inventory/emission tables.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of items in the bill of materials.
    #[arg(short = 'n', long)]
    num_items: usize,

    /// Number of root (top-level assembly) items; must stay below the item
    /// count.
    #[arg(short = 'r', long, default_value_t = 2)]
    num_roots: usize,

    /// Maximum tier depth of the BOM. Accepted for compatibility but not
    /// enforced by the builder.
    #[arg(long, default_value_t = 3)]
    max_depth: usize,

    /// Maximum number of parent items a component or subassembly can have.
    #[arg(long, default_value_t = 2)]
    max_parents: usize,

    /// Minimum demand for final (leaf) items.
    #[arg(long, default_value_t = 10)]
    min_demand: u64,

    /// Maximum demand for final (leaf) items.
    #[arg(long, default_value_t = 100)]
    max_demand: u64,

    /// Seed for the BOM builder. Drawn at random (and logged) when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Seed for the facility siting sampler, independent of the BOM seed.
    #[arg(long, default_value_t = 10)]
    location_seed: u64,

    /// Seed for the item-to-facility assembly stage.
    #[arg(long, default_value_t = 1)]
    assignment_seed: u64,

    /// Number of candidate facilities to place.
    #[arg(short = 'f', long)]
    num_facilities: usize,

    /// Path to a GeoJSON FeatureCollection with region boundary polygons.
    #[arg(long)]
    regions_file: PathBuf,

    /// ISO-3166 alpha-3 codes of permitted regions (comma separated).
    /// Defaults to the built-in allow-list.
    #[arg(long, value_delimiter = ',')]
    region_codes: Vec<String>,

    /// Total draw budget for the facility rejection-sampling loop.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u64,

    /// Logging verbosity level (`trace`, `debug`, `info`, `warn`, `error`).
    #[arg(short, long, default_value = "info")]
    verbosity: String,
}

/// Cross-field validation of the configuration surface, ahead of any
/// generation work.
fn validate(args: &Cli) -> Result<()> {
    ensure!(args.num_items >= 2, "--num-items must be at least 2, got {}", args.num_items);
    ensure!(
        args.num_roots >= 1 && args.num_roots < args.num_items,
        "--num-roots must be in [1, num_items), got {}",
        args.num_roots
    );
    ensure!(
        args.min_demand <= args.max_demand,
        "--min-demand {} exceeds --max-demand {}",
        args.min_demand,
        args.max_demand
    );
    ensure!(
        args.num_facilities >= 2,
        "--num-facilities must be at least 2 so every item gets sourcing alternatives, got {}",
        args.num_facilities
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Conform to crate-standard logging.
    scig_core::logging::setup(&args.verbosity);
    validate(&args)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    if args.seed.is_none() {
        info!(seed, "no BOM seed supplied, drew one at random");
    }

    let codes: Vec<&str> = if args.region_codes.is_empty() {
        DEFAULT_REGION_CODES.to_vec()
    } else {
        args.region_codes.iter().map(String::as_str).collect()
    };
    let mut regions = RegionSet::from_geojson_file(&args.regions_file, &codes)
        .context("loading region boundary data")?;
    info!(regions = regions.len(), "loaded permitted regions");

    let config = GenerationConfig {
        bom: BomParams {
            num_items: args.num_items,
            num_roots: args.num_roots,
            max_depth: args.max_depth,
            max_parents: args.max_parents,
            min_demand: args.min_demand,
            max_demand: args.max_demand,
            seed,
        },
        siting: SitingParams {
            count: args.num_facilities,
            seed: args.location_seed,
            max_attempts: args.max_attempts,
            min_demand: args.min_demand,
        },
        assembly: AssemblyParams {
            seed: args.assignment_seed,
            min_demand: args.min_demand,
            max_demand: args.max_demand,
        },
    };

    generation::run(&config, &mut regions)
}
