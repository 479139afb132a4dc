//! Distance metrics and small numeric helpers shared by clustering and counting

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minkowski-family distance used by the clustering primitives
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// L2
    #[default]
    Euclidean,
    /// L1
    Manhattan,
    /// L-infinity
    Chebyshev,
    /// General Lp with `p >= 1`
    Minkowski { p: f64 },
}

impl Metric {
    /// Reject parameters that do not define a metric
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Minkowski { p } if !p.is_finite() || p < 1.0 => Err(Error::InvalidConfig(
                format!("minkowski p must be finite and >= 1, got {}", p),
            )),
            _ => Ok(()),
        }
    }

    /// Distance between two equal-length points
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        match *self {
            Self::Euclidean => euclidean(a, b),
            Self::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            Self::Chebyshev => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
            Self::Minkowski { p } => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs().powf(p))
                .sum::<f64>()
                .powf(1.0 / p),
        }
    }
}

/// Euclidean distance
#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
