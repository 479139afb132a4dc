//! Cluster-to-device count estimation

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ReferenceTable;
use crate::clustering::Cluster;
use crate::error::{Error, Result};

/// How surviving clusters turn into a device count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountingMethod {
    /// One device per cluster
    #[default]
    Simple,
    /// Divide the cluster's frame count by the expected per-device volume
    Advanced,
}

/// Rate-based device counter
///
/// A cluster of `N` frames seen over `T` seconds, whose nearest reference
/// model probes at `L` frames per second, holds about `N / (L * T)` devices.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCounter {
    pub method: CountingMethod,
    /// Frames per second above which a cluster is not trusted to follow `L`
    pub max_plausible_rate: f64,
    /// Count assigned to clusters that fail the plausibility check
    pub default_counter: u64,
}

impl RateCounter {
    pub fn new(method: CountingMethod, max_plausible_rate: f64, default_counter: u64) -> Self {
        Self {
            method,
            max_plausible_rate,
            default_counter,
        }
    }

    /// Estimated devices behind one cluster, given its reference rate
    ///
    /// `frames` is the cluster size, `distinct_macs` caps the result and
    /// `duration` is the capture window in seconds. A non-positive window
    /// contributes nothing.
    pub fn estimate_with_rate(
        &self,
        frames: usize,
        distinct_macs: usize,
        rate: f64,
        duration: f64,
    ) -> u64 {
        if duration.is_nan() || duration <= 0.0 {
            return 0;
        }

        let n = frames as f64;
        let k = if n / duration < self.max_plausible_rate && rate.is_finite() && rate > 0.0 {
            let k = (n / (rate * duration)).round_ties_even();
            if k >= 1.0 {
                k as u64
            } else {
                1
            }
        } else {
            self.default_counter
        };

        k.min(distinct_macs as u64)
    }

    /// Estimated devices behind one cluster
    pub fn estimate_cluster(
        &self,
        cluster: &Cluster,
        table: &ReferenceTable,
        duration: f64,
    ) -> Result<u64> {
        let rate = table.nearest_rate(&cluster.mean_fingerprint)?;
        let k = self.estimate_with_rate(cluster.size(), cluster.mac_set.len(), rate, duration);
        debug!(
            label = cluster.label,
            frames = cluster.size(),
            macs = cluster.mac_set.len(),
            rate,
            devices = k,
            "cluster estimate"
        );
        Ok(k)
    }

    /// Devices behind all clusters
    pub fn count(&self, clusters: &[Cluster], table: &ReferenceTable, duration: f64) -> Result<u64> {
        match self.method {
            CountingMethod::Simple => Ok(clusters.len() as u64),
            CountingMethod::Advanced => {
                if table.is_empty() {
                    return Err(Error::EmptyReferenceTable);
                }
                if (duration.is_nan() || duration <= 0.0) && !clusters.is_empty() {
                    warn!(duration, "capture window is empty, clusters contribute no devices");
                }
                clusters
                    .iter()
                    .map(|c| self.estimate_cluster(c, table, duration))
                    .sum()
            }
        }
    }
}

impl Default for RateCounter {
    fn default() -> Self {
        Self::new(CountingMethod::Simple, 100.0, 1)
    }
}
