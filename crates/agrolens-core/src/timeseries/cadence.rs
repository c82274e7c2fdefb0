//! Candidate observation dates for a series request.

use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AgroError, Result};

/// Spacing between candidate dates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Interval derived from the span length. The series stops once
    /// `max_points` dates have yielded an observation.
    #[default]
    Auto,
    /// Fixed interval in days.
    Days(u32),
}

impl Cadence {
    /// How many observations a series at this cadence collects before it
    /// stops fetching. Fixed cadences fetch every candidate date.
    pub fn observation_limit(self, max_points: usize) -> Option<usize> {
        match self {
            Self::Auto => Some(max_points.max(1)),
            Self::Days(_) => None,
        }
    }
}

impl FromStr for Cadence {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let days = s
            .trim_end_matches(['d', 'D'])
            .parse::<u32>()
            .map_err(|_| AgroError::InvalidParameter(format!("invalid cadence '{s}'")))?;
        Ok(Self::Days(days))
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Days(d) => write!(f, "{d}d"),
        }
    }
}

/// Sampling interval for a span: weekly for a month, fortnightly up to a
/// quarter, three-weekly up to half a year, monthly beyond, widened so the
/// span yields at most `max_points` steps.
pub fn auto_interval_days(span_days: i64, max_points: usize) -> i64 {
    let spread = span_days / max_points.max(1) as i64;
    let floor = match span_days {
        d if d <= 30 => 7,
        d if d <= 90 => 14,
        d if d <= 180 => 21,
        _ => 30,
    };
    spread.max(floor)
}

/// Dates `start, start + step, ...` up to and including `end`. `max_points`
/// only widens the automatic interval; see [`Cadence::observation_limit`].
pub fn candidate_dates(
    start: NaiveDate,
    end: NaiveDate,
    cadence: Cadence,
    max_points: usize,
) -> Result<Vec<NaiveDate>> {
    if start > end {
        return Err(AgroError::InvalidParameter(format!(
            "start date {start} is after end date {end}"
        )));
    }
    let span = (end - start).num_days();
    let step = match cadence {
        Cadence::Auto => auto_interval_days(span, max_points),
        Cadence::Days(0) => {
            return Err(AgroError::InvalidParameter(
                "cadence must be at least one day".into(),
            ))
        }
        Cadence::Days(d) => d as i64,
    };

    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current += Duration::days(step);
    }
    Ok(dates)
}
