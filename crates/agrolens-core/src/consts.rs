/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Denominators with a smaller magnitude mark the pixel invalid.
pub const DENOMINATOR_EPSILON: f32 = 1e-6;

/// Square metres per hectare.
pub const M2_PER_HECTARE: f64 = 10_000.0;

/// Upper bound of the "low" vegetation band used by `zones_percent`.
pub const LOW_BAND_UPPER: f32 = 0.3;

/// Upper bound of the "medium" vegetation band used by `zones_percent`.
pub const MEDIUM_BAND_UPPER: f32 = 0.6;

/// Zone counts accepted by the zoning engine.
pub const ALLOWED_ZONE_COUNTS: [usize; 3] = [3, 4, 5];

/// Fewer valid pixels than this cannot be zoned.
pub const MIN_ZONING_PIXELS: usize = 20;

/// Default k-means iteration cap.
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 300;

/// Default k-means convergence threshold on the largest centroid shift.
pub const DEFAULT_KMEANS_TOLERANCE: f64 = 1e-6;

/// Default minimum connected-component size (pixels) emitted as a polygon.
/// 1 keeps every island.
pub const DEFAULT_MIN_POLYGON_PIXELS: usize = 1;

/// Default cloud-coverage ceiling for a date to count as an observation.
pub const DEFAULT_MAX_CLOUD_COVERAGE_PERCENT: f64 = 60.0;

/// Default share of clear in-field pixels needed to trust `mean_index`.
pub const DEFAULT_MIN_VALID_PIXELS_PERCENT: f64 = 30.0;

/// Default number of ImageSource calls in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Default cap on candidate dates sampled by the automatic cadence.
pub const DEFAULT_MAX_SERIES_POINTS: usize = 10;

/// Minimum series length accepted by the forecast engine.
pub const MIN_FORECAST_POINTS: usize = 10;

/// Largest forecast horizon, in days.
pub const MAX_FORECAST_HORIZON_DAYS: u32 = 90;

/// Mean tropical year length used by the cyclic day-of-year features.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Default number of boosting stages.
pub const DEFAULT_GBRT_ESTIMATORS: usize = 200;

/// Default shrinkage applied to each boosting stage.
pub const DEFAULT_GBRT_LEARNING_RATE: f64 = 0.05;

/// Default regression tree depth.
pub const DEFAULT_GBRT_MAX_DEPTH: usize = 3;

/// Default minimum number of rows in a tree leaf.
pub const DEFAULT_GBRT_MIN_SAMPLES_LEAF: usize = 2;

/// Default row subsampling fraction per stage (1.0 disables subsampling).
pub const DEFAULT_GBRT_SUBSAMPLE: f64 = 1.0;

/// Default seed for the boosting row sampler.
pub const DEFAULT_GBRT_SEED: u64 = 42;

/// Mean Earth radius in metres, used for pixel ground-area estimates.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Sentinel-2 L2A digital numbers per unit reflectance.
pub const SENTINEL2_DN_SCALE: f32 = 10_000.0;

/// Default synthetic scene edge length in pixels.
pub const DEFAULT_SYNTHETIC_GRID_SIZE: usize = 512;

/// Default share of synthetic pixels flagged as cloud (SCL 8/9).
pub const DEFAULT_SYNTHETIC_CLOUD_FRACTION: f64 = 0.05;

/// Default share of synthetic pixels flagged as cloud shadow (SCL 3).
pub const DEFAULT_SYNTHETIC_SHADOW_FRACTION: f64 = 0.02;

/// Default seed for the synthetic image source.
pub const DEFAULT_SYNTHETIC_SEED: u64 = 42;
