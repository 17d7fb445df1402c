//! Instance assembler.
//!
//! Binds each BOM item to a random subset of facilities (its sourcing
//! alternatives) and derives the per-pair tables: processing time and
//! inventory are sampled only for mapped pairs, production-GHG is a pure
//! function of processing time and is never independently sampled.

use anyhow::{
    ensure,
    Result,
};
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use tracing::instrument;

use crate::model::Facility;

/// Minimum number of facilities mapped to every item.
pub const MIN_SITES_PER_ITEM: usize = 2;
/// Smallest processing time for a mapped (item, facility) pair.
pub const MIN_PROCESSING_TIME: u64 = 5;
/// Largest processing time for a mapped (item, facility) pair.
pub const MAX_PROCESSING_TIME: u64 = 10;

/// Parameters for the assembly stage.
#[derive(Clone, Debug)]
pub struct AssemblyParams {
    /// Seed for the assembler's private random generator.
    pub seed: u64,
    /// Minimum leaf demand of the instance; scales the inventory bounds.
    pub min_demand: u64,
    /// Maximum leaf demand of the instance; scales the inventory bounds and
    /// the production-GHG derivation.
    pub max_demand: u64,
}

/// The item-to-facility binding and its derived tables.
///
/// All tables are rectangular `num_items x num_facilities` and indexed by
/// item id then facility id; entries are nonzero only for mapped pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Per item, its mapped facility ids in ascending order.
    pub site_map: Vec<Vec<usize>>,
    /// Processing time per (item, facility); `[5, 10]` if mapped, else 0.
    pub processing_time: Vec<Vec<u64>>,
    /// Inventory per (item, facility);
    /// `[min_demand * 2, max_demand * 2]` if mapped, else 0.
    pub inventory: Vec<Vec<u64>>,
    /// Production-GHG per (item, facility):
    /// `processing_time * max_demand`, derived, never sampled.
    pub production_emission: Vec<Vec<u64>>,
}

impl Assignment {
    /// Whether `facility` is one of `item`'s sourcing alternatives.
    #[must_use]
    pub fn is_mapped(&self, item: usize, facility: usize) -> bool {
        self.site_map[item].binary_search(&facility).is_ok()
    }
}

/// Bind `num_items` items to facility subsets and derive the tables.
///
/// Subset sizes are drawn uniformly from
/// `[MIN_SITES_PER_ITEM, max(3, m / 3)]` (clamped to the facility count
/// `m`), and members are sampled without replacement; subsets are
/// independent per item and may overlap.
#[instrument(skip(facilities), fields(num_items, num_facilities = facilities.len()))]
pub fn assemble(num_items: usize, facilities: &[Facility], params: &AssemblyParams) -> Result<Assignment> {
    let num_facilities = facilities.len();
    ensure!(
        num_facilities >= MIN_SITES_PER_ITEM,
        "need at least {MIN_SITES_PER_ITEM} facilities to map sourcing alternatives, got {num_facilities}"
    );
    ensure!(
        params.min_demand <= params.max_demand,
        "min_demand {} exceeds max_demand {}",
        params.min_demand,
        params.max_demand
    );

    let mut rng = StdRng::seed_from_u64(params.seed);
    let largest_subset = (num_facilities / 3).max(3).min(num_facilities);

    let mut site_map = Vec::with_capacity(num_items);
    for _ in 0..num_items {
        let size = rng.gen_range(MIN_SITES_PER_ITEM..=largest_subset);
        let mut sites = rand::seq::index::sample(&mut rng, num_facilities, size).into_vec();
        sites.sort_unstable();
        site_map.push(sites);
    }

    let mut processing_time = vec![vec![0_u64; num_facilities]; num_items];
    for (item, sites) in site_map.iter().enumerate() {
        for &facility in sites {
            processing_time[item][facility] = rng.gen_range(MIN_PROCESSING_TIME..=MAX_PROCESSING_TIME);
        }
    }

    let mut inventory = vec![vec![0_u64; num_facilities]; num_items];
    for (item, sites) in site_map.iter().enumerate() {
        for &facility in sites {
            inventory[item][facility] = rng.gen_range(params.min_demand * 2..=params.max_demand * 2);
        }
    }

    let production_emission = processing_time
        .iter()
        .map(|row| row.iter().map(|&pt| pt * params.max_demand).collect())
        .collect();

    Ok(Assignment {
        site_map,
        processing_time,
        inventory,
        production_emission,
    })
}
