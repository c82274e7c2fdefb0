pub mod colormap;
pub mod field;
pub mod overlay;

pub use field::{
    aggregate, cloud_coverage_percent, summarize, zone_distribution, FieldStats, IndexSummary,
    ZoneDistribution,
};
pub use overlay::{encode_png, render_overlay, save_png, Overlay};
