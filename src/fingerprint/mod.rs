//! Capability fingerprints of randomized-address frames
//!
//! Each probe request from a locally administered address is reduced to a
//! four-component [`FingerprintVector`] built from its VHT, Extended and HT
//! capabilities and its Vendor-Specific elements. Devices rotating their
//! address keep emitting the same capabilities, so fingerprints of one device
//! model land close together.
//!
//! # Example
//!
//! ```
//! use probecount::fingerprint::extract;
//! use probecount::frame::InformationElement;
//!
//! let elements = vec![InformationElement::VhtCapabilities { info: Some("ab".into()) }];
//! let fp = extract(&elements);
//!
//! assert_eq!(fp.vht(), 195.0);
//! assert_eq!(fp.ext(), -1.0);
//! ```

mod canonical;
mod extractor;

use serde::{Deserialize, Serialize};

use crate::frame::MacAddress;

pub use canonical::{canonical_byte_sum, canonical_bytes, numeric_field_sum, oui_byte_sum};
pub use extractor::{encode, extract};

/// Fingerprint component fed by an element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Vht,
    Ext,
    Ht,
    Vendor,
}

impl Component {
    fn index(self) -> usize {
        match self {
            Self::Vht => 0,
            Self::Ext => 1,
            Self::Ht => 2,
            Self::Vendor => 3,
        }
    }
}

/// `(vht, ext, ht, vendor)` capability scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FingerprintVector(pub [f64; 4]);

impl Default for FingerprintVector {
    fn default() -> Self {
        Self([Self::SENTINEL; 4])
    }
}

impl FingerprintVector {
    /// Value of a component that could not be computed
    pub const SENTINEL: f64 = -1.0;

    pub fn new(vht: f64, ext: f64, ht: f64, vendor: f64) -> Self {
        Self([vht, ext, ht, vendor])
    }

    pub fn vht(&self) -> f64 {
        self.0[0]
    }

    pub fn ext(&self) -> f64 {
        self.0[1]
    }

    pub fn ht(&self) -> f64 {
        self.0[2]
    }

    pub fn vendor(&self) -> f64 {
        self.0[3]
    }

    pub fn get(&self, component: Component) -> f64 {
        self.0[component.index()]
    }

    pub fn as_array(&self) -> &[f64; 4] {
        &self.0
    }

    /// Overwrite a component
    pub fn set(&mut self, component: Component, score: f64) {
        self.0[component.index()] = score;
    }

    /// Add to a component, replacing the sentinel on first use
    pub fn accumulate(&mut self, component: Component, score: f64) {
        let slot = &mut self.0[component.index()];
        if *slot == Self::SENTINEL {
            *slot = score;
        } else {
            *slot += score;
        }
    }

    /// Elementwise arithmetic mean, `None` for an empty input
    pub fn mean<'a, I>(vectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a FingerprintVector>,
    {
        let mut sum = [0.0f64; 4];
        let mut count = 0usize;
        for v in vectors {
            for (acc, x) in sum.iter_mut().zip(v.0) {
                *acc += x;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self(sum.map(|s| s / count as f64)))
    }
}

/// Fingerprints and their source addresses, index-aligned
///
/// Filled append-only during the scan and read once by the cluster engine.
#[derive(Debug, Clone, Default)]
pub struct FingerprintDataset {
    fingerprints: Vec<FingerprintVector>,
    sources: Vec<MacAddress>,
}

impl FingerprintDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fingerprint: FingerprintVector, source: MacAddress) {
        self.fingerprints.push(fingerprint);
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn fingerprints(&self) -> &[FingerprintVector] {
        &self.fingerprints
    }

    pub fn sources(&self) -> &[MacAddress] {
        &self.sources
    }

    pub fn get(&self, idx: usize) -> Option<(&FingerprintVector, &MacAddress)> {
        Some((self.fingerprints.get(idx)?, self.sources.get(idx)?))
    }
}
