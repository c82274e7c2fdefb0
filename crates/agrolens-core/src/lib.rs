pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod indices;
pub mod progress;
pub mod raster;
pub mod source;
pub mod stats;
pub mod timeseries;
pub mod zoning;
