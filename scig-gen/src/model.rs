//! Data model shared across the generation stages.

use std::fmt;

use petgraph::graph::DiGraph;
use serde::Serialize;

/// The bill-of-materials graph: items on the nodes, integer usage
/// quantities on the edges. An edge `u -> v` means item `v` consumes
/// `weight` units of item `u`.
///
/// Node indices coincide with item ids because items are inserted in id
/// order and never removed.
pub type BomGraph = DiGraph<Item, u32>;

/// A single item (node) in the bill of materials.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Item {
    /// Item id in `[0, n)`; equals the node index in the [`BomGraph`].
    pub id: usize,
    /// Independent demand. Positive for leaf items, zero everywhere else.
    pub demand: u64,
}

/// A candidate production facility with its sampled attributes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Facility {
    /// Facility id, matching the order in which locations were accepted.
    pub id: usize,
    /// Latitude in degrees, inside a permitted region.
    pub lat: f64,
    /// Longitude in degrees, inside a permitted region.
    pub lon: f64,
    /// Production lead time / time-to-recover, in `[2, 10]`.
    pub lead_time: u32,
    /// Abstract service/resilience ranking, in `[1, 10]`.
    pub service_index: u32,
    /// Production capacity, scaled from the instance demand bounds.
    pub capacity: u64,
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Facility {}: lat {:.4}, lon {:.4}, lead time {}, service index {}, capacity {}",
            self.id, self.lat, self.lon, self.lead_time, self.service_index, self.capacity
        )
    }
}
