use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::entities::{FeatureVector, FEATURE_COUNT};
use crate::errors::AnalysisError;

const MAX_SAMPLES: usize = 256;
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
pub struct IsolationForest {
    pub n_trees: usize,
    pub contamination: f64,
    pub seed: u64,
}

#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl IsolationForest {
    pub fn new(n_trees: usize, contamination: f64, seed: u64) -> Self {
        Self {
            n_trees,
            contamination,
            seed,
        }
    }

    /// Fits on `points` and flags the outliers among them (`1` = anomalous).
    pub fn fit_predict(&self, points: &[FeatureVector]) -> Result<Vec<u8>, AnalysisError> {
        let scores = self.fit_scores(points)?;
        let negated: Vec<f64> = scores.iter().map(|s| -s).collect();
        let offset = percentile(&negated, self.contamination * 100.0);
        Ok(negated
            .iter()
            .map(|value| u8::from(*value < offset))
            .collect())
    }

    /// Anomaly score per point in `(0, 1]`; higher means easier to isolate.
    pub fn fit_scores(&self, points: &[FeatureVector]) -> Result<Vec<f64>, AnalysisError> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(AnalysisError::InvalidParameter(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.n_trees == 0 {
            return Err(AnalysisError::InvalidParameter(
                "isolation forest needs at least one tree".to_string(),
            ));
        }
        if points.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                engine: "anomaly_detection",
                required: 2,
                available: points.len(),
            });
        }

        let sample_size = points.len().min(MAX_SAMPLES);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let trees: Vec<Node> = (0..self.n_trees)
            .map(|_| {
                let indices = sample(&mut rng, points.len(), sample_size).into_vec();
                build_tree(points, indices, 0, height_limit, &mut rng)
            })
            .collect();

        let normalizer = average_path_length(sample_size);
        Ok(points
            .iter()
            .map(|point| {
                let mean_depth = trees
                    .iter()
                    .map(|tree| path_length(tree, point, 0))
                    .sum::<f64>()
                    / trees.len() as f64;
                2f64.powf(-mean_depth / normalizer)
            })
            .collect())
    }
}

fn build_tree(
    points: &[FeatureVector],
    indices: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut ChaCha8Rng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Only features that still vary inside this node can split it.
    let mut candidates = Vec::with_capacity(FEATURE_COUNT);
    for feature in 0..FEATURE_COUNT {
        let (min, max) = bounds(points, &indices, feature);
        if max > min {
            candidates.push((feature, min, max));
        }
    }
    if candidates.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(min..max);
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|idx| points[*idx][feature] < threshold);
    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(points, left, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(points, right, depth + 1, height_limit, rng)),
    }
}

fn bounds(points: &[FeatureVector], indices: &[usize], feature: usize) -> (f64, f64) {
    indices
        .iter()
        .map(|idx| points[*idx][feature])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn path_length(node: &Node, point: &FeatureVector, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if point[*feature] < *threshold {
                path_length(left, point, depth + 1)
            } else {
                path_length(right, point, depth + 1)
            }
        }
    }
}

/// Average path length of an unsuccessful search in a binary search tree of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated percentile, `q` in `[0, 100]`.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
