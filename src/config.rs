//! Run parameters
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a valid
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clustering::ClusterMethod;
use crate::counting::{CountingMethod, RateCounter, RateVariant, ReferenceTable};
use crate::error::{Error, Result};
use crate::math::Metric;
use crate::traits::ClusteringPrimitive;

/// Counting pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frames at or below this signal strength (dBm) are dropped
    pub power_threshold: i32,
    /// Share of processed frames that must be locally administered before
    /// clustering runs
    pub min_percentage: f64,
    pub cluster_method: ClusterMethod,
    /// DBSCAN radius
    pub epsilon: f64,
    pub min_samples: usize,
    pub metric: Metric,
    /// Frames per second above which a cluster gets `default_counter`
    pub max_ratio: f64,
    pub default_counter: u64,
    pub rate_modality: RateVariant,
    pub counting_method: CountingMethod,
    /// Membership store size in bits
    pub store_bits: usize,
    pub store_hashes: usize,
    /// Decoy entries inserted into a fresh store
    pub initial_noise: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            power_threshold: -70,
            min_percentage: 0.02,
            cluster_method: ClusterMethod::Optics,
            epsilon: 0.001,
            min_samples: 15,
            metric: Metric::Euclidean,
            max_ratio: 100.0,
            default_counter: 1,
            rate_modality: RateVariant::MeanRate,
            counting_method: CountingMethod::Simple,
            store_bits: 10_000,
            store_hashes: 7,
            initial_noise: 30,
        }
    }
}

impl Config {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_percentage) {
            return Err(Error::InvalidConfig(format!(
                "min_percentage must be within [0, 1], got {}",
                self.min_percentage
            )));
        }
        if self.cluster_method == ClusterMethod::Dbscan
            && !(self.epsilon.is_finite() && self.epsilon > 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        if self.min_samples == 0 {
            return Err(Error::InvalidConfig("min_samples must be at least 1".into()));
        }
        if self.max_ratio.is_nan() || self.max_ratio <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_ratio must be positive, got {}",
                self.max_ratio
            )));
        }
        if self.store_bits == 0 || self.store_hashes == 0 {
            return Err(Error::InvalidConfig(
                "store_bits and store_hashes must be at least 1".into(),
            ));
        }
        self.metric.validate()
    }

    /// Clustering primitive selected by `cluster_method`
    pub fn clustering_primitive(&self) -> Box<dyn ClusteringPrimitive> {
        self.cluster_method
            .primitive(self.epsilon, self.min_samples, self.metric)
    }

    pub fn rate_counter(&self) -> RateCounter {
        RateCounter::new(self.counting_method, self.max_ratio, self.default_counter)
    }

    /// Load a models file, taking each model's rate from `rate_modality`
    pub fn reference_table(&self, models: impl AsRef<Path>) -> Result<ReferenceTable> {
        ReferenceTable::from_models_path(models, self.rate_modality)
    }
}
