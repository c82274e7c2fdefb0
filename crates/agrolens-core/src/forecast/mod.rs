//! Short-horizon forecasting of an index series from calendar features.

pub mod config;
mod engine;
pub mod features;
pub mod gbrt;

pub use config::ForecastConfig;
pub use engine::{
    forecast, forecast_reported, ForecastModelMetadata, ForecastPoint, ForecastResult,
    MODEL_TYPE,
};
