#![deny(
    // Overly strict on purpose: a quality seal that forces inline allows at the
    // places where we consciously deviate, so a reviewer knows where to look.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]

//! # scig-gen – synthetic multi-echelon supply-chain instance generator
//!
//! scig-gen produces structurally valid, seed-reproducible random test
//! instances for supply-chain / manufacturing optimization research: a
//! bill-of-materials (BOM) dependency DAG over items, a geographically
//! distributed candidate-facility network, and the derived cross tables
//! (sourcing alternatives, processing times, inventory, emissions) that
//! downstream solvers consume.
//!
//! ## Pipeline overview
//! 1. BOM construction ([`bom::build`]) – grow a connected multi-parent DAG
//!    over `n` items from `num_roots` source nodes, repair connectivity, and
//!    assign demand to the leaves.
//! 2. Graph analysis ([`analysis::node_depths`], [`analysis::longest_path`]) –
//!    multi-source BFS depth labeling and a topological longest-path DP over
//!    the finished graph.
//! 3. Facility siting ([`siting::sample_facilities`]) – rejection-sample
//!    coordinates inside permitted regions (supplied by
//!    [`scig_core::regions`]) and assign per-facility attributes.
//! 4. Network matrices ([`matrix::build_matrices`]) – pairwise haversine
//!    distances and derived transport emissions.
//! 5. Assembly ([`assemble::assemble`]) – bind each item to a random subset
//!    of facilities and derive the processing-time, inventory and
//!    production-GHG tables.
//!
//! The entry point [`generation::run`] orchestrates these stages and dumps
//! the finished data model (report text, JSON, CSV tables) into a
//! timestamped directory under `runs/`. [`generation::generate`] is the pure
//! half: it returns the data model without touching the filesystem.
//!
//! Every stage draws from an explicit, independently seeded generator so
//! that re-running any subsystem alone with its seed reproduces identical
//! output. Long-running stages carry [`tracing`] spans.

pub mod analysis;
pub mod assemble;
pub mod bom;
pub mod export;
pub mod generation;
pub mod matrix;
pub mod model;
pub mod siting;
pub mod utils;

pub use model::{
    BomGraph,
    Facility,
    Item,
};
