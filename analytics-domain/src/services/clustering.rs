use std::collections::{BTreeMap, HashSet};

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans as LinfaKMeans;
use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::entities::{FeatureVector, FEATURE_COUNT};
use crate::errors::AnalysisError;

const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub n_init: usize,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centers: Vec<FeatureVector>,
    pub inertia: f64,
}

impl KMeansFit {
    /// Members per cluster id, every id in `0..k` present.
    pub fn cluster_counts(&self) -> BTreeMap<usize, u64> {
        let mut counts: BTreeMap<usize, u64> = (0..self.centers.len()).map(|id| (id, 0)).collect();
        for label in &self.labels {
            *counts.entry(*label).or_default() += 1;
        }
        counts
    }
}

impl KMeans {
    pub fn new(k: usize, n_init: usize, seed: u64) -> Self {
        Self { k, n_init, seed }
    }

    /// k-means++ seeded Lloyd fit, best of `n_init` runs.
    pub fn fit(&self, points: &[FeatureVector]) -> Result<KMeansFit, AnalysisError> {
        if self.k == 0 {
            return Err(AnalysisError::InvalidParameter(
                "cluster count must be at least 1".to_string(),
            ));
        }
        let distinct = distinct_points(points);
        if distinct < self.k {
            return Err(AnalysisError::InsufficientData {
                engine: "clustering",
                required: self.k,
                available: distinct,
            });
        }

        let observations = Array2::from_shape_vec(
            (points.len(), FEATURE_COUNT),
            points.iter().flatten().copied().collect(),
        )
        .map_err(|err| AnalysisError::InvalidParameter(err.to_string()))?;
        let dataset = DatasetBase::from(observations);

        let rng = ChaCha8Rng::seed_from_u64(self.seed);
        let model = LinfaKMeans::params_with_rng(self.k, rng)
            .n_runs(self.n_init.max(1))
            .max_n_iterations(MAX_ITERATIONS)
            .tolerance(TOLERANCE)
            .fit(&dataset)
            .map_err(|err| AnalysisError::InvalidParameter(format!("k-means fit failed: {}", err)))?;

        let centers: Vec<FeatureVector> = model
            .centroids()
            .rows()
            .into_iter()
            .map(|row| {
                let mut center = [0.0; FEATURE_COUNT];
                for (slot, value) in center.iter_mut().zip(row.iter()) {
                    *slot = *value;
                }
                center
            })
            .collect();
        let mut labels: Vec<usize> = model.predict(dataset.records()).to_vec();
        reseed_empty_clusters(points, &mut labels, &centers, self.k);

        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(point, label)| squared_distance(point, &centers[*label]))
            .sum();
        Ok(KMeansFit {
            labels,
            centers,
            inertia,
        })
    }
}

fn distinct_points(points: &[FeatureVector]) -> usize {
    points
        .iter()
        .map(|p| p.map(f64::to_bits))
        .collect::<HashSet<_>>()
        .len()
}

fn squared_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

// A cluster left without members takes over the point lying farthest from
// its own center, chosen among clusters that can spare a member.
fn reseed_empty_clusters(
    points: &[FeatureVector],
    labels: &mut [usize],
    centers: &[FeatureVector],
    k: usize,
) {
    loop {
        let mut sizes = vec![0usize; k];
        for label in labels.iter() {
            sizes[*label] += 1;
        }
        let Some(empty) = sizes.iter().position(|size| *size == 0) else {
            return;
        };
        let donor = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| sizes[**label] > 1)
            .map(|(idx, label)| (idx, squared_distance(&points[idx], &centers[*label])))
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
        match donor {
            Some((idx, _)) => labels[idx] = empty,
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<FeatureVector> {
        let mut points = Vec::new();
        for i in 0..10 {
            points.push([1.0 + (i % 2) as f64, 0.0, 1.0, 0.0]);
            points.push([12.0 + (i % 3) as f64, 3.0, 0.0, 1.0]);
            points.push([22.0, 6.0 - (i % 2) as f64, 1.0, 0.0]);
        }
        points
    }

    #[test]
    fn counts_cover_every_point() {
        let points = blobs();
        let fit = KMeans::new(3, 10, 42).fit(&points).expect("fit");
        let counts = fit.cluster_counts();
        assert_eq!(counts.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(counts.values().sum::<u64>(), points.len() as u64);
        // Three well separated groups of ten.
        let mut sizes: Vec<u64> = counts.values().copied().collect();
        sizes.sort();
        assert_eq!(sizes, vec![10, 10, 10]);
    }

    #[test]
    fn same_seed_same_partition() {
        let points = blobs();
        let a = KMeans::new(3, 4, 7).fit(&points).expect("fit");
        let b = KMeans::new(3, 4, 7).fit(&points).expect("fit");
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn too_few_distinct_points_is_insufficient_data() {
        let points = vec![[1.0, 0.0, 1.0, 0.0]; 50];
        let mut more = points.clone();
        more.push([2.0, 0.0, 1.0, 0.0]);
        assert_eq!(
            KMeans::new(3, 10, 42).fit(&more).expect_err("two distinct"),
            AnalysisError::InsufficientData {
                engine: "clustering",
                required: 3,
                available: 2,
            }
        );
        assert!(matches!(
            KMeans::new(3, 10, 42).fit(&[]),
            Err(AnalysisError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn exactly_k_distinct_points_fills_every_cluster() {
        let mut points = vec![[0.0, 0.0, 0.0, 0.0]; 20];
        points.push([5.0, 0.0, 0.0, 0.0]);
        points.push([10.0, 0.0, 0.0, 0.0]);
        let fit = KMeans::new(3, 10, 42).fit(&points).expect("fit");
        let counts = fit.cluster_counts();
        assert!(counts.values().all(|count| *count > 0));
        assert_eq!(counts.values().sum::<u64>(), 22);
    }

    #[test]
    fn reseeding_fills_an_empty_cluster() {
        let points = vec![[0.0; 4], [1.0, 0.0, 0.0, 0.0], [9.0, 0.0, 0.0, 0.0]];
        let centers = vec![[0.5, 0.0, 0.0, 0.0], [9.0, 0.0, 0.0, 0.0], [4.0, 0.0, 0.0, 0.0]];
        let mut labels = vec![0, 0, 1];
        reseed_empty_clusters(&points, &mut labels, &centers, 3);
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2]);
    }
}
