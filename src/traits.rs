//! Seams between the pipeline and its pluggable parts
//!
//! The pipeline talks to the address filter through [`MembershipSketch`] and to
//! the density-based clustering algorithm through [`ClusteringPrimitive`].

use crate::clustering::ClusterLabel;
use crate::error::Result;
use crate::fingerprint::FingerprintVector;

/// Membership testing sketches (Bloom filters, etc.)
pub trait MembershipSketch {
    /// Add an item to the set
    fn insert(&mut self, item: &[u8]);

    /// Test if item might be in set
    ///
    /// - `true` means item might be present (possible false positive)
    /// - `false` means item is definitely not present
    fn contains(&self, item: &[u8]) -> bool;

    /// Theoretical false positive rate given current state
    fn false_positive_rate(&self) -> f64;

    /// Number of items added, decoys included
    fn len(&self) -> usize;

    /// Check if filter is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A density-based clustering algorithm
///
/// Implementations return exactly one label per input point, in input order,
/// using [`ClusterLabel::Noise`] for outliers. Identical inputs must produce
/// identical labels.
pub trait ClusteringPrimitive {
    fn fit(&self, points: &[FingerprintVector]) -> Result<Vec<ClusterLabel>>;
}

impl<T: ClusteringPrimitive + ?Sized> ClusteringPrimitive for Box<T> {
    fn fit(&self, points: &[FingerprintVector]) -> Result<Vec<ClusterLabel>> {
        (**self).fit(points)
    }
}
