//! Management zoning: clustering of index values into ordered classes and
//! vectorization of each class into polygons.

pub mod components;
pub mod config;
mod engine;
pub mod kmeans;
pub mod trace;

pub use config::ZoningConfig;
pub use engine::{
    check_zone_count, create_zones, zone_label, Zone, ZoneFeatureCollection, ZoningResult,
};
