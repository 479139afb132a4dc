//! Density-reachability ordering (OPTICS)
//!
//! Points are ordered so that each one follows the already-ordered point it is
//! most density-reachable from. Clusters are then read off the reachability
//! plot: a cluster is a run of points whose reachability stays under a cut,
//! and a jump above the cut starts a new cluster or marks noise.

use super::{validate_min_samples, ClusterLabel};
use crate::error::{Error, Result};
use crate::fingerprint::FingerprintVector;
use crate::math::Metric;
use crate::traits::ClusteringPrimitive;

/// Smallest reachability jump, as a ratio, that separates two clusters
const MIN_GAP_RATIO: f64 = 2.0;

/// OPTICS over fingerprint vectors
///
/// Without a radius to tune, the cut is derived from the data: the widest
/// jump in the sorted reachability distances separates within-cluster steps
/// from between-cluster ones. Clusters smaller than `min_samples` are
/// relabelled as noise.
#[derive(Clone, Debug, PartialEq)]
pub struct Optics {
    /// Minimum neighborhood size of a core point, itself included
    pub min_samples: usize,
    /// Largest neighborhood radius considered, `f64::INFINITY` for unbounded
    pub max_eps: f64,
    pub metric: Metric,
}

/// Reachability plot produced by the ordering pass
#[derive(Clone, Debug, PartialEq)]
pub struct ReachabilityPlot {
    /// Point indices in processing order
    pub ordering: Vec<usize>,
    /// Reachability distance per point index, infinite when unreachable
    pub reachability: Vec<f64>,
    /// Core distance per point index, infinite for non-core points
    pub core_distance: Vec<f64>,
}

impl Optics {
    pub fn new(min_samples: usize, metric: Metric) -> Self {
        Self {
            min_samples,
            max_eps: f64::INFINITY,
            metric,
        }
    }

    /// Bound the neighborhood radius
    pub fn with_max_eps(mut self, max_eps: f64) -> Self {
        self.max_eps = max_eps;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_eps.is_nan() || self.max_eps <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_eps must be positive, got {}",
                self.max_eps
            )));
        }
        validate_min_samples(self.min_samples)?;
        self.metric.validate()
    }

    fn distances_from(&self, points: &[FingerprintVector], idx: usize) -> Vec<f64> {
        let center = points[idx].as_array();
        points
            .iter()
            .map(|p| self.metric.distance(center, p.as_array()))
            .collect()
    }

    fn core_distance(&self, mut distances: Vec<f64>) -> f64 {
        distances.retain(|&d| d <= self.max_eps);
        if distances.len() < self.min_samples {
            return f64::INFINITY;
        }
        let (_, kth, _) = distances.select_nth_unstable_by(self.min_samples - 1, f64::total_cmp);
        *kth
    }

    /// Compute the OPTICS ordering and reachability distances
    ///
    /// Distance rows are computed per point as needed, so memory stays linear
    /// in the number of points.
    pub fn reachability_plot(&self, points: &[FingerprintVector]) -> Result<ReachabilityPlot> {
        self.validate()?;

        let n = points.len();
        let core_distance: Vec<f64> = (0..n)
            .map(|i| self.core_distance(self.distances_from(points, i)))
            .collect();

        let mut reachability = vec![f64::INFINITY; n];
        let mut processed = vec![false; n];
        let mut ordering = Vec::with_capacity(n);

        for start in 0..n {
            if processed[start] {
                continue;
            }

            let mut current = start;
            loop {
                processed[current] = true;
                ordering.push(current);

                let core = core_distance[current];
                if core.is_finite() {
                    for (other, d) in self.distances_from(points, current).into_iter().enumerate() {
                        if processed[other] || d > self.max_eps {
                            continue;
                        }
                        let candidate = core.max(d);
                        if candidate < reachability[other] {
                            reachability[other] = candidate;
                        }
                    }
                }

                // next seed: smallest finite reachability, lowest index on ties
                let next = (0..n)
                    .filter(|&i| !processed[i] && reachability[i].is_finite())
                    .min_by(|&a, &b| reachability[a].total_cmp(&reachability[b]).then(a.cmp(&b)));
                match next {
                    Some(i) => current = i,
                    None => break,
                }
            }
        }

        Ok(ReachabilityPlot {
            ordering,
            reachability,
            core_distance,
        })
    }

    /// Reachability threshold separating clusters
    ///
    /// Sorted finite reachabilities are scanned for the widest multiplicative
    /// gap. A gap of at least [`MIN_GAP_RATIO`] is cut at its midpoint;
    /// otherwise nothing reachable is cut. The result never exceeds `max_eps`.
    fn cut(&self, plot: &ReachabilityPlot) -> f64 {
        let mut finite: Vec<f64> = plot
            .reachability
            .iter()
            .copied()
            .filter(|r| r.is_finite())
            .collect();
        finite.sort_by(f64::total_cmp);

        let widest = finite
            .windows(2)
            .map(|w| (gap_ratio(w[0], w[1]), w[0], w[1]))
            .fold(None, |best: Option<(f64, f64, f64)>, gap| match best {
                Some(b) if b.0 >= gap.0 => Some(b),
                _ => Some(gap),
            });

        let cut = match widest {
            Some((ratio, lo, hi)) if ratio >= MIN_GAP_RATIO => (lo + hi) / 2.0,
            _ => f64::INFINITY,
        };
        cut.min(self.max_eps)
    }
}

fn gap_ratio(lo: f64, hi: f64) -> f64 {
    if lo > 0.0 {
        hi / lo
    } else if hi > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

impl ClusteringPrimitive for Optics {
    fn fit(&self, points: &[FingerprintVector]) -> Result<Vec<ClusterLabel>> {
        let plot = self.reachability_plot(points)?;
        let cut = self.cut(&plot);

        let mut raw = vec![None; points.len()];
        let mut sizes: Vec<usize> = Vec::new();
        let mut current: Option<usize> = None;

        for &p in &plot.ordering {
            let reach = plot.reachability[p];
            if reach.is_infinite() || reach > cut {
                let core = plot.core_distance[p];
                current = if core.is_finite() && core <= cut {
                    sizes.push(0);
                    Some(sizes.len() - 1)
                } else {
                    None
                };
            }
            if let Some(c) = current {
                raw[p] = Some(c);
                sizes[c] += 1;
            }
        }

        // keep clusters of at least min_samples, renumbered in ordering order
        let mut renumber: Vec<Option<u32>> = vec![None; sizes.len()];
        let mut next_label = 0u32;
        for (c, &size) in sizes.iter().enumerate() {
            if size >= self.min_samples {
                renumber[c] = Some(next_label);
                next_label += 1;
            }
        }

        Ok(raw
            .into_iter()
            .map(|c| match c.and_then(|c| renumber[c]) {
                Some(label) => ClusterLabel::Cluster(label),
                None => ClusterLabel::Noise,
            })
            .collect())
    }
}
