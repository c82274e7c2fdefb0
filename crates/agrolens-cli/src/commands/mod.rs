pub mod analyze;
pub mod config;
pub mod field;
pub mod forecast;
pub mod indices;
pub mod series;
pub mod zones;
