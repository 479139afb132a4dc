//! Reference table of known device models and their probe rates

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fingerprint::FingerprintVector;
use crate::math::euclidean;

/// Which measured rate of a model to count with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateVariant {
    LockedRate,
    AwakeRate,
    ActiveRate,
    #[default]
    MeanRate,
}

impl RateVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LockedRate => "locked_rate",
            Self::AwakeRate => "awake_rate",
            Self::ActiveRate => "active_rate",
            Self::MeanRate => "mean_rate",
        }
    }
}

/// A known device model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDeviceProfile {
    pub model_id: String,
    /// Fingerprint the model emits
    pub fingerprint_prototype: FingerprintVector,
    /// Probe requests per second
    pub rate: f64,
}

impl ReferenceDeviceProfile {
    pub fn new(model_id: impl Into<String>, fingerprint_prototype: FingerprintVector, rate: f64) -> Self {
        Self {
            model_id: model_id.into(),
            fingerprint_prototype,
            rate,
        }
    }
}

/// One entry of a models file
#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: serde_json::Value,
    cap_id: [f64; 4],
    locked_rate: Option<f64>,
    awake_rate: Option<f64>,
    active_rate: Option<f64>,
    mean_rate: Option<f64>,
}

impl ModelEntry {
    fn rate(&self, variant: RateVariant) -> Option<f64> {
        match variant {
            RateVariant::LockedRate => self.locked_rate,
            RateVariant::AwakeRate => self.awake_rate,
            RateVariant::ActiveRate => self.active_rate,
            RateVariant::MeanRate => self.mean_rate,
        }
    }

    fn model_id(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Read-only table of [`ReferenceDeviceProfile`]s
///
/// Several profiles may share a prototype; lookups average their rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    profiles: Vec<ReferenceDeviceProfile>,
}

impl ReferenceTable {
    pub fn new(profiles: Vec<ReferenceDeviceProfile>) -> Self {
        Self { profiles }
    }

    /// Parse a models file
    ///
    /// The file maps arbitrary keys to
    /// `{"id", "cap_id": [vht, ext, ht, vendor], "locked_rate", "awake_rate", "active_rate", "mean_rate"}`;
    /// `variant` picks which rate each profile carries. Profiles are ordered
    /// by key.
    pub fn from_models_json(json: &str, variant: RateVariant) -> Result<Self> {
        let entries: BTreeMap<String, ModelEntry> = serde_json::from_str(json)?;

        let profiles = entries
            .into_iter()
            .map(|(key, entry)| {
                let rate = entry.rate(variant).ok_or_else(|| {
                    Error::InvalidConfig(format!("model {key} has no {}", variant.as_str()))
                })?;
                let [vht, ext, ht, vendor] = entry.cap_id;
                Ok(ReferenceDeviceProfile::new(
                    entry.model_id(),
                    FingerprintVector::new(vht, ext, ht, vendor),
                    rate,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { profiles })
    }

    /// Load a models file from disk
    pub fn from_models_path(path: impl AsRef<Path>, variant: RateVariant) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_models_json(&content, variant)
    }

    pub fn profiles(&self) -> &[ReferenceDeviceProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Rate of the profiles nearest to `fingerprint`
    ///
    /// The first profile at minimum Euclidean distance fixes the prototype;
    /// every profile sharing that prototype contributes to the mean rate.
    pub fn nearest_rate(&self, fingerprint: &FingerprintVector) -> Result<f64> {
        let target = fingerprint.as_array();
        let nearest = self
            .profiles
            .iter()
            .map(|p| (p, euclidean(p.fingerprint_prototype.as_array(), target)))
            .fold(None, |best: Option<(&ReferenceDeviceProfile, f64)>, (p, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((p, d)),
            })
            .map(|(p, _)| p.fingerprint_prototype)
            .ok_or(Error::EmptyReferenceTable)?;

        let (sum, count) = self
            .profiles
            .iter()
            .filter(|p| p.fingerprint_prototype == nearest)
            .fold((0.0, 0usize), |(sum, count), p| (sum + p.rate, count + 1));
        Ok(sum / count as f64)
    }
}
