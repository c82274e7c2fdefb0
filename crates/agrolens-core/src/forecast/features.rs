//! Calendar features, the only predictors available to the forecaster.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

use crate::consts::DAYS_PER_YEAR;

pub const FEATURE_NAMES: [&str; 5] = ["day_offset", "doy_sin", "doy_cos", "iso_week", "month"];

pub type FeatureRow = [f64; 5];

/// Features of `date` relative to the first training date `origin`.
pub fn date_features(date: NaiveDate, origin: NaiveDate) -> FeatureRow {
    let doy = date.ordinal() as f64;
    let angle = 2.0 * PI * doy / DAYS_PER_YEAR;
    [
        (date - origin).num_days() as f64,
        angle.sin(),
        angle.cos(),
        date.iso_week().week() as f64,
        date.month() as f64,
    ]
}
