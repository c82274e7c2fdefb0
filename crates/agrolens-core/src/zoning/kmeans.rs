//! One-dimensional k-means over scalar index values.

use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{AgroError, Result};

/// Converged clustering of a value list.
#[derive(Clone, Debug)]
pub struct KmeansResult {
    /// Final centroid of each cluster, in seed order.
    pub centroids: Vec<f64>,
    /// Cluster of each input value.
    pub labels: Vec<usize>,
    pub iterations: usize,
}

/// Sorted distinct values.
pub fn distinct_sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted
}

/// Deterministic seeds at the quantile midpoints of the distinct values.
///
/// Fails with `InsufficientDiversity` when fewer than `k` distinct values
/// exist.
pub fn seed_centroids(values: &[f64], k: usize) -> Result<Vec<f64>> {
    let distinct = distinct_sorted(values);
    let n = distinct.len();
    if n < k {
        return Err(AgroError::InsufficientDiversity {
            distinct: n,
            requested: k,
        });
    }
    Ok((0..k)
        .map(|i| {
            let idx = (i * n / k) + n / (2 * k);
            distinct[idx.min(n - 1)]
        })
        .collect())
}

/// Index of the closest centroid. Ties go to the lower index.
fn nearest(value: f64, centroids: &[f64]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &c) in centroids.iter().enumerate() {
        let dist = (value - c).abs();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Lloyd's algorithm from quantile seeds.
///
/// Empty clusters keep their previous centroid.
pub fn kmeans_1d(
    values: &[f64],
    k: usize,
    max_iterations: usize,
    tolerance: f64,
) -> Result<KmeansResult> {
    if k < 2 {
        return Err(AgroError::InvalidParameter(format!(
            "k-means requires k >= 2, got {k}"
        )));
    }
    let mut centroids = seed_centroids(values, k)?;
    let mut labels = vec![0usize; values.len()];
    let parallel = values.len() >= PARALLEL_PIXEL_THRESHOLD;
    let mut iterations = 0;

    for _ in 0..max_iterations.max(1) {
        iterations += 1;
        if parallel {
            labels
                .par_iter_mut()
                .zip(values.par_iter())
                .for_each(|(label, &v)| *label = nearest(v, &centroids));
        } else {
            for (label, &v) in labels.iter_mut().zip(values) {
                *label = nearest(v, &centroids);
            }
        }

        let mut sums = vec![0.0f64; k];
        let mut counts = vec![0usize; k];
        for (&label, &v) in labels.iter().zip(values) {
            sums[label] += v;
            counts[label] += 1;
        }

        let mut max_shift = 0.0f64;
        for c in 0..k {
            if counts[c] > 0 {
                let updated = sums[c] / counts[c] as f64;
                max_shift = max_shift.max((updated - centroids[c]).abs());
                centroids[c] = updated;
            }
        }

        if max_shift < tolerance {
            break;
        }
    }

    Ok(KmeansResult {
        centroids,
        labels,
        iterations,
    })
}
