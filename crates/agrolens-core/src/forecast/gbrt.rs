//! Least-squares gradient-boosted regression trees.
//!
//! Stage 0 predicts the target mean. Each later stage fits a depth-limited
//! regression tree to the current residuals with exact greedy splits and
//! adds it scaled by the learning rate.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::ForecastConfig;
use super::features::FeatureRow;

/// Split gains below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

#[derive(Clone, Debug)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &FeatureRow) -> f64 {
        match self {
            Node::Leaf(v) => *v,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Best variance-reducing split of `rows`, honouring the leaf size floor.
fn best_split(
    x: &[FeatureRow],
    target: &[f64],
    rows: &[usize],
    min_samples_leaf: usize,
) -> Option<BestSplit> {
    let n = rows.len();
    if n < 2 * min_samples_leaf {
        return None;
    }
    let total: f64 = rows.iter().map(|&r| target[r]).sum();
    let parent_score = total * total / n as f64;

    let mut best: Option<(usize, f64, f64)> = None;
    let mut sorted = rows.to_vec();
    for feature in 0..x.first().map_or(0, |r| r.len()) {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
        let mut left_sum = 0.0;
        for i in 0..n - 1 {
            left_sum += target[sorted[i]];
            let left_n = i + 1;
            let right_n = n - left_n;
            if left_n < min_samples_leaf || right_n < min_samples_leaf {
                continue;
            }
            let here = x[sorted[i]][feature];
            let next = x[sorted[i + 1]][feature];
            if here == next {
                continue;
            }
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64;
            let gain = score - parent_score;
            if gain > MIN_GAIN && best.map_or(true, |(_, _, g)| gain > g) {
                best = Some((feature, (here + next) / 2.0, gain));
            }
        }
    }

    best.map(|(feature, threshold, _)| {
        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.iter().copied().partition(|&r| x[r][feature] <= threshold);
        BestSplit {
            feature,
            threshold,
            left,
            right,
        }
    })
}

fn mean_of(target: &[f64], rows: &[usize]) -> f64 {
    rows.iter().map(|&r| target[r]).sum::<f64>() / rows.len().max(1) as f64
}

fn grow(
    x: &[FeatureRow],
    target: &[f64],
    rows: &[usize],
    depth: usize,
    config: &ForecastConfig,
) -> Node {
    if depth >= config.max_depth {
        return Node::Leaf(mean_of(target, rows));
    }
    match best_split(x, target, rows, config.min_samples_leaf) {
        Some(split) => Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(grow(x, target, &split.left, depth + 1, config)),
            right: Box::new(grow(x, target, &split.right, depth + 1, config)),
        },
        None => Node::Leaf(mean_of(target, rows)),
    }
}

/// Fitted boosting ensemble.
#[derive(Clone, Debug)]
pub struct GradientBoostedTrees {
    init: f64,
    learning_rate: f64,
    trees: Vec<Node>,
}

impl GradientBoostedTrees {
    /// Fit on feature rows `x` and targets `y` (same length, non-empty).
    pub fn fit(x: &[FeatureRow], y: &[f64], config: &ForecastConfig) -> Self {
        let n = y.len();
        let init = if n == 0 {
            0.0
        } else {
            y.iter().sum::<f64>() / n as f64
        };
        let mut prediction = vec![init; n];
        let mut residuals = vec![0.0; n];
        let mut trees = Vec::with_capacity(config.n_estimators);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let all_rows: Vec<usize> = (0..n).collect();
        let sample_size = ((n as f64 * config.subsample).round() as usize).clamp(1, n.max(1));

        for _ in 0..config.n_estimators {
            if n == 0 {
                break;
            }
            for i in 0..n {
                residuals[i] = y[i] - prediction[i];
            }
            let rows = if sample_size < n {
                let mut sampled = rand::seq::index::sample(&mut rng, n, sample_size).into_vec();
                sampled.sort_unstable();
                sampled
            } else {
                all_rows.clone()
            };
            let tree = grow(x, &residuals, &rows, 0, config);
            for i in 0..n {
                prediction[i] += config.learning_rate * tree.predict(&x[i]);
            }
            trees.push(tree);
        }

        Self {
            init,
            learning_rate: config.learning_rate,
            trees,
        }
    }

    pub fn predict(&self, row: &FeatureRow) -> f64 {
        self.init
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict(row))
                .sum::<f64>()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Root-mean-square error on the given rows.
    pub fn rmse(&self, x: &[FeatureRow], y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let sse: f64 = x
            .iter()
            .zip(y)
            .map(|(row, &target)| (self.predict(row) - target).powi(2))
            .sum();
        (sse / y.len() as f64).sqrt()
    }
}
