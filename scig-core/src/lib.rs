//! # scig-core – shared infrastructure for the SCIG instance generator
//!
//! This crate holds the pieces of SCIG that are not generation algorithms:
//!
//! * [`logging`] – crate-standard `tracing` subscriber setup, called once
//!   from binary entrypoints.
//! * [`regions`] – the region boundary provider: named country/region
//!   polygons loaded from GeoJSON and filtered by an allow-list, exposing
//!   the point-containment test and per-region acceptance counters the
//!   facility siting sampler is built on.

pub mod logging;
pub mod regions;
