//! Density-based clustering of fingerprints
//!
//! The [`ClusterEngine`] hands the fingerprint dataset to a pluggable
//! [`ClusteringPrimitive`], drops the points it labels as noise and groups
//! the rest into [`Cluster`]s, each a hypothesized device model.
//!
//! # Algorithms
//!
//! - [`Optics`]: reachability ordering with a data-derived cut
//! - [`Dbscan`]: fixed-radius clustering
//!
//! # Example
//!
//! ```
//! use probecount::clustering::{ClusterEngine, Dbscan};
//! use probecount::fingerprint::{FingerprintDataset, FingerprintVector};
//! use probecount::frame::MacAddress;
//! use probecount::math::Metric;
//!
//! let mut dataset = FingerprintDataset::new();
//! for i in 0..5u8 {
//!     let mac = MacAddress([0x02, 0, 0, 0, 0, i]);
//!     dataset.push(FingerprintVector::new(195.0, 8.0, 29.0, 42.0), mac);
//! }
//!
//! let engine = ClusterEngine::new(Dbscan::new(0.5, 3, Metric::Euclidean));
//! let clusters = engine.run(&dataset).unwrap();
//!
//! assert_eq!(clusters.len(), 1);
//! assert_eq!(clusters[0].mac_set.len(), 5);
//! ```

mod dbscan;
mod optics;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fingerprint::{FingerprintDataset, FingerprintVector};
use crate::frame::MacAddress;
use crate::math::Metric;
use crate::traits::ClusteringPrimitive;

pub use dbscan::Dbscan;
pub use optics::{Optics, ReachabilityPlot};

/// Label assigned to a point by a clustering primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterLabel {
    Noise,
    Cluster(u32),
}

impl ClusterLabel {
    pub fn is_noise(&self) -> bool {
        matches!(self, Self::Noise)
    }
}

/// Which reference primitive to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    #[default]
    Optics,
    Dbscan,
}

impl ClusterMethod {
    /// Build the primitive for this method
    ///
    /// `epsilon` is the DBSCAN radius and is ignored by OPTICS.
    pub fn primitive(
        self,
        epsilon: f64,
        min_samples: usize,
        metric: Metric,
    ) -> Box<dyn ClusteringPrimitive> {
        match self {
            Self::Optics => Box::new(Optics::new(min_samples, metric)),
            Self::Dbscan => Box::new(Dbscan::new(epsilon, min_samples, metric)),
        }
    }
}

/// A group of fingerprints believed to come from one device model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub label: u32,
    /// Dataset indices of the members, ascending
    pub member_indices: Vec<usize>,
    pub mean_fingerprint: FingerprintVector,
    /// Distinct source addresses of the members
    pub mac_set: BTreeSet<MacAddress>,
    /// Mean numeric value of the members' addresses, duplicates included
    pub mean_address: f64,
}

impl Cluster {
    /// Number of member frames
    pub fn size(&self) -> usize {
        self.member_indices.len()
    }
}

/// Runs a clustering primitive and groups its output
#[derive(Debug, Clone)]
pub struct ClusterEngine<P> {
    primitive: P,
}

impl<P: ClusteringPrimitive> ClusterEngine<P> {
    pub fn new(primitive: P) -> Self {
        Self { primitive }
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Cluster the dataset, dropping noise
    ///
    /// Clusters come back sorted by label. An empty dataset yields no
    /// clusters without calling the primitive.
    pub fn run(&self, dataset: &FingerprintDataset) -> Result<Vec<Cluster>> {
        if dataset.is_empty() {
            return Ok(Vec::new());
        }

        let labels = self.primitive.fit(dataset.fingerprints())?;
        if labels.len() != dataset.len() {
            return Err(Error::LabelCountMismatch {
                expected: dataset.len(),
                found: labels.len(),
            });
        }

        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, label) in labels.into_iter().enumerate() {
            if let ClusterLabel::Cluster(label) = label {
                groups.entry(label).or_default().push(idx);
            }
        }

        Ok(groups
            .into_iter()
            .filter_map(|(label, members)| build_cluster(dataset, label, members))
            .collect())
    }
}

fn build_cluster(dataset: &FingerprintDataset, label: u32, members: Vec<usize>) -> Option<Cluster> {
    let fingerprints = dataset.fingerprints();
    let sources = dataset.sources();

    let mean_fingerprint = FingerprintVector::mean(members.iter().map(|&i| &fingerprints[i]))?;
    let mac_set = members.iter().map(|&i| sources[i]).collect();
    let address_sum: f64 = members.iter().map(|&i| sources[i].as_u64() as f64).sum();
    let mean_address = address_sum / members.len() as f64;

    Some(Cluster {
        label,
        member_indices: members,
        mean_fingerprint,
        mac_set,
        mean_address,
    })
}

/// Indices of all points within `eps` of `points[idx]`, itself included
pub(crate) fn neighbors_within(
    points: &[FingerprintVector],
    idx: usize,
    eps: f64,
    metric: &Metric,
) -> Vec<usize> {
    let center = points[idx].as_array();
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| metric.distance(center, p.as_array()) <= eps)
        .map(|(i, _)| i)
        .collect()
}

pub(crate) fn validate_min_samples(min_samples: usize) -> Result<()> {
    if min_samples == 0 {
        return Err(Error::InvalidConfig("min_samples must be at least 1".into()));
    }
    Ok(())
}
