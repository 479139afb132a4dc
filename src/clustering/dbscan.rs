//! Fixed-radius density clustering (DBSCAN)

use std::collections::VecDeque;

use super::{neighbors_within, validate_min_samples, ClusterLabel};
use crate::error::{Error, Result};
use crate::fingerprint::FingerprintVector;
use crate::math::Metric;
use crate::traits::ClusteringPrimitive;

/// DBSCAN over fingerprint vectors
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within `epsilon` of it. Clusters grow from core points in
/// input order, so labels are numbered by first visit.
///
/// # Example
///
/// ```
/// use probecount::clustering::{ClusterLabel, Dbscan};
/// use probecount::fingerprint::FingerprintVector;
/// use probecount::math::Metric;
/// use probecount::traits::ClusteringPrimitive;
///
/// let points = vec![FingerprintVector::new(1.0, 1.0, 1.0, 1.0); 3];
/// let labels = Dbscan::new(0.5, 3, Metric::Euclidean).fit(&points).unwrap();
///
/// assert!(labels.iter().all(|&l| l == ClusterLabel::Cluster(0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Dbscan {
    /// Neighborhood radius
    pub epsilon: f64,
    /// Minimum neighborhood size of a core point, itself included
    pub min_samples: usize,
    pub metric: Metric,
}

impl Dbscan {
    pub fn new(epsilon: f64, min_samples: usize, metric: Metric) -> Self {
        Self {
            epsilon,
            min_samples,
            metric,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        validate_min_samples(self.min_samples)?;
        self.metric.validate()
    }
}

impl ClusteringPrimitive for Dbscan {
    fn fit(&self, points: &[FingerprintVector]) -> Result<Vec<ClusterLabel>> {
        self.validate()?;

        let n = points.len();
        let mut labels = vec![ClusterLabel::Noise; n];
        // a point is marked visited when it is first queued, so each point
        // enters the seed queue at most once
        let mut visited = vec![false; n];
        let mut next_label = 0u32;

        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited[start] = true;

            let neighbors = neighbors_within(points, start, self.epsilon, &self.metric);
            if neighbors.len() < self.min_samples {
                continue;
            }

            let label = ClusterLabel::Cluster(next_label);
            next_label += 1;
            labels[start] = label;

            let mut seeds = VecDeque::new();
            let mut reached = neighbors;
            loop {
                for q in reached {
                    if labels[q] == ClusterLabel::Noise {
                        labels[q] = label;
                    }
                    if !visited[q] {
                        visited[q] = true;
                        seeds.push_back(q);
                    }
                }

                let Some(p) = seeds.pop_front() else {
                    break;
                };
                let expansion = neighbors_within(points, p, self.epsilon, &self.metric);
                reached = if expansion.len() >= self.min_samples {
                    expansion
                } else {
                    Vec::new()
                };
            }
        }

        Ok(labels)
    }
}
