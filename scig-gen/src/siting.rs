//! Facility siting sampler.
//!
//! Rejection-samples uniform points in the global lon/lat box until enough
//! of them land inside a permitted region, then assigns per-facility
//! attributes in acceptance order. The containment test and the
//! under-representation bias both live in [`scig_core::regions`]; this
//! module owns the loop, its attempt budget, and the attribute draws.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use scig_core::regions::RegionSet;
use thiserror::Error;
use tracing::{
    debug,
    info,
    instrument,
};

use crate::model::Facility;

/// Attempt budget used when the caller does not set one. Generous: at the
/// default region set's acceptance rate this covers thousands of
/// facilities.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

/// Smallest lead time a facility can be assigned.
pub const MIN_LEAD_TIME: u32 = 2;
/// Largest lead time a facility can be assigned.
pub const MAX_LEAD_TIME: u32 = 10;
/// Smallest service index a facility can be assigned.
pub const MIN_SERVICE_INDEX: u32 = 1;
/// Largest service index a facility can be assigned.
pub const MAX_SERVICE_INDEX: u32 = 10;
/// Capacity lower bound as a multiple of the instance's minimum demand.
pub const CAPACITY_MIN_FACTOR: u64 = 5;
/// Capacity upper bound as a multiple of the instance's minimum demand.
pub const CAPACITY_MAX_FACTOR: u64 = 10;

/// Parameters for the siting sampler.
#[derive(Clone, Debug)]
pub struct SitingParams {
    /// Number of facilities to place.
    pub count: usize,
    /// Seed for the sampler's private random generator, independent of the
    /// BOM seed.
    pub seed: u64,
    /// Total draw budget before the loop gives up with
    /// [`SamplingExhausted`].
    pub max_attempts: u64,
    /// Minimum leaf demand of the instance; scales facility capacity.
    pub min_demand: u64,
}

/// Raised when the rejection loop cannot place the requested facilities
/// within its attempt budget.
///
/// Recoverable by retrying with relaxed regions, fewer facilities, or a
/// larger budget; distinct from the fatal region-resource errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(
    "facility siting exhausted its budget of {attempts} attempts after placing {placed} of {requested} facilities; \
     retry with more permissive regions, fewer facilities, or a larger --max-attempts"
)]
pub struct SamplingExhausted {
    /// Facilities the caller asked for.
    pub requested: usize,
    /// Facilities placed before the budget ran out.
    pub placed: usize,
    /// Attempts consumed.
    pub attempts: u64,
}

/// Sample `params.count` facilities inside the permitted regions.
///
/// Points are drawn uniformly from `[-180, 180] x [-90, 90]` (longitude
/// first) and tested via [`RegionSet::accept`], which biases acceptance
/// toward under-represented regions. Once all points are placed,
/// attributes are drawn in ascending facility id order from the same
/// generator.
#[instrument(skip(regions), fields(count = params.count, seed = params.seed))]
pub fn sample_facilities(params: &SitingParams, regions: &mut RegionSet) -> Result<Vec<Facility>> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(params.count);
    let mut attempts: u64 = 0;

    while points.len() < params.count {
        if attempts >= params.max_attempts {
            return Err(SamplingExhausted {
                requested: params.count,
                placed: points.len(),
                attempts,
            }
            .into());
        }
        attempts += 1;

        let lon = rng.gen_range(-180.0..180.0);
        let lat = rng.gen_range(-90.0..90.0);
        if let Some(region) = regions.accept(lon, lat) {
            debug!(region = regions.code(region), lon, lat, "accepted facility location");
            points.push((lon, lat));
        }
    }
    info!(placed = points.len(), attempts, "facility siting complete");

    let facilities = points
        .into_iter()
        .enumerate()
        .map(|(id, (lon, lat))| Facility {
            id,
            lat,
            lon,
            lead_time: rng.gen_range(MIN_LEAD_TIME..=MAX_LEAD_TIME),
            service_index: rng.gen_range(MIN_SERVICE_INDEX..=MAX_SERVICE_INDEX),
            capacity: rng.gen_range(params.min_demand * CAPACITY_MIN_FACTOR..=params.min_demand * CAPACITY_MAX_FACTOR),
        })
        .collect();

    Ok(facilities)
}
