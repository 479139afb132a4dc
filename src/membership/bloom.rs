//! Bloom filter with deniability accounting
//!
//! Unlike a sizing-oriented Bloom filter, the store keeps its exact bit length
//! `n` (positions are reduced modulo `n`, not a word-aligned size) so that
//! persisted filters stay comparable across runs.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::compress;
use super::estimate::cardinality_from_fill;
use crate::error::{Error, Result};
use crate::traits::MembershipSketch;

/// Size of the 48-bit MAC address universe
const ADDRESS_UNIVERSE: f64 = 281_474_976_710_656.0;

/// Probabilistic membership store over an `n`-bit array with `k` hashes
///
/// # Example
///
/// ```
/// use probecount::membership::MembershipStore;
///
/// let mut store = MembershipStore::new(10_000, 7).unwrap();
/// store.add(b"00:11:22:33:44:55");
///
/// assert!(store.check(b"00:11:22:33:44:55"));
/// assert_eq!(store.inserted_count(), 1);
/// ```
///
/// # Set-bit count
///
/// `m` is recounted from the bit array after every mutation, including the
/// ones that set bits directly (noise, intersection, [`set_bits`]). Every
/// estimator therefore reads the live fill of the array.
///
/// [`set_bits`]: MembershipStore::set_bits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipStore {
    /// Bit array, 64 bits per word, trailing bits of the last word unused
    bits: Vec<u64>,
    /// Number of bits (n)
    n: usize,
    /// Number of hash functions (k)
    k: usize,
    /// Number of bits set to 1 (m)
    m: usize,
    /// Raw insertion counter, decoys included
    inserted_count: u64,
}

impl MembershipStore {
    /// Create an empty store with `n` bits and `k` hash functions
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidConfig("filter size n must be positive".into()));
        }
        if k == 0 {
            return Err(Error::InvalidConfig("hash count k must be positive".into()));
        }

        Ok(Self {
            bits: vec![0u64; n.div_ceil(64)],
            n,
            k,
            m: 0,
            inserted_count: 0,
        })
    }

    /// Rebuild a store from its compressed run-length text
    pub fn decompress(text: &str, n: usize, k: usize) -> Result<Self> {
        let bits = compress::decode_runs(text, n)?;
        let mut store = Self::new(n, k)?;
        store.set_bits(&bits)?;
        Ok(store)
    }

    /// Rebuild a store from its persisted form
    ///
    /// The stored insertion counter wins over the approximation that
    /// [`set_bits`](Self::set_bits) would derive.
    pub fn from_persisted(persisted: &PersistedStore) -> Result<Self> {
        let mut store = Self::decompress(&persisted.data, persisted.n, persisted.k)?;
        store.inserted_count = persisted.inserted_count;
        Ok(store)
    }

    /// Capture the `(n, k)` parameters and compressed bits
    pub fn to_persisted(&self) -> PersistedStore {
        PersistedStore {
            n: self.n,
            k: self.k,
            inserted_count: self.inserted_count,
            data: self.compress(),
        }
    }

    #[inline]
    fn position(&self, item: &[u8], seed: usize) -> usize {
        (xxh3_64_with_seed(item, seed as u64) % self.n as u64) as usize
    }

    #[inline]
    fn set_bit(&mut self, idx: usize) {
        self.bits[idx / 64] |= 1u64 << (idx % 64);
    }

    /// Read the bit at `idx`
    ///
    /// # Panics
    ///
    /// Panics if `idx >= n`
    #[inline]
    pub fn bit(&self, idx: usize) -> bool {
        assert!(idx < self.n, "bit index {} out of range {}", idx, self.n);
        self.bits[idx / 64] & (1u64 << (idx % 64)) != 0
    }

    /// Iterate over all `n` bits in order
    pub fn iter_bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.n).map(move |i| self.bits[i / 64] & (1u64 << (i % 64)) != 0)
    }

    fn recount(&mut self) {
        self.m = self.bits.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Insert an item into the filter
    pub fn add(&mut self, item: &[u8]) {
        for seed in 0..self.k {
            let idx = self.position(item, seed);
            self.set_bit(idx);
        }
        self.recount();
        self.inserted_count += 1;
    }

    /// Check if an item might be in the filter
    ///
    /// Returns `true` if the item might be in the set (possibly a false positive),
    /// or `false` if the item is definitely not in the set.
    pub fn check(&self, item: &[u8]) -> bool {
        (0..self.k).all(|seed| self.bit(self.position(item, seed)))
    }

    /// Clear every bit and zero both counters
    pub fn reset(&mut self) {
        self.bits.fill(0);
        self.m = 0;
        self.inserted_count = 0;
    }

    /// Replace the bit array wholesale
    ///
    /// `m` is recounted and the insertion counter is approximated from the
    /// cardinality estimator (0 when the estimate is singular).
    pub fn set_bits(&mut self, bits: &[bool]) -> Result<()> {
        if bits.len() != self.n {
            return Err(Error::IncompatibleFilter {
                expected: format!("{} bits", self.n),
                found: format!("{} bits", bits.len()),
            });
        }

        self.bits.fill(0);
        for (idx, &bit) in bits.iter().enumerate() {
            if bit {
                self.set_bit(idx);
            }
        }
        self.recount();
        self.inserted_count = self
            .estimate_cardinality()
            .map(|c| c as u64)
            .unwrap_or(0);
        Ok(())
    }

    /// Add `count` decoy entries of `k` uniformly random bits each
    ///
    /// Decoys are not hashed items; they only raise the fill of the array so
    /// that the true population size is harder to infer.
    pub fn anonymization_noise(&mut self, count: usize) {
        self.anonymization_noise_with_rng(count, &mut rand::thread_rng());
    }

    /// Same as [`anonymization_noise`](Self::anonymization_noise) with a caller-supplied RNG
    pub fn anonymization_noise_with_rng<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        for _ in 0..count {
            for _ in 0..self.k {
                let idx = rng.gen_range(0..self.n);
                self.set_bit(idx);
            }
        }
        self.recount();
        self.inserted_count += count as u64;
        trace!(count, m = self.m, "anonymization noise applied");
    }

    /// Bitwise AND of two filters with identical `(n, k)`
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        self.ensure_compatible(other)?;

        let mut result = Self::new(self.n, self.k)?;
        for (out, (a, b)) in result.bits.iter_mut().zip(self.bits.iter().zip(&other.bits)) {
            *out = a & b;
        }
        result.recount();
        result.inserted_count = result
            .estimate_cardinality()
            .map(|c| c as u64)
            .unwrap_or(0);
        Ok(result)
    }

    pub(crate) fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self.n != other.n || self.k != other.k {
            return Err(Error::IncompatibleFilter {
                expected: format!("n={}, k={}", self.n, self.k),
                found: format!("n={}, k={}", other.n, other.k),
            });
        }
        Ok(())
    }

    /// Estimate the number of distinct items from the fill ratio
    ///
    /// `-(n/k) * ln(1 - m/n)`. Fails when the filter is saturated.
    pub fn estimate_cardinality(&self) -> Result<f64> {
        cardinality_from_fill(self.n, self.k, self.m as f64)
    }

    /// Probability that a fresh item tests positive: `(m/n)^k`
    pub fn false_positive_probability(&self) -> f64 {
        self.fill_ratio().powi(self.k as i32)
    }

    /// Fraction of bits set
    pub fn fill_ratio(&self) -> f64 {
        self.m as f64 / self.n as f64
    }

    /// Minimum plausible-deniability guarantee for any inserted address
    ///
    /// Over the 2^48 address universe, `v = (U - N) * p^k` foreign addresses
    /// are expected to test positive at fill `p = m/n`. The guarantee is the
    /// probability `(1 - exp(-v*k / (n*p)))^k` that such a foreign address
    /// covers all `k` positions of a given inserted one. An empty filter gives 0.
    pub fn deniability(&self) -> f64 {
        let p = self.fill_ratio();
        if p <= 0.0 {
            return 0.0;
        }

        let k = self.k as f64;
        let foreign = (ADDRESS_UNIVERSE - self.inserted_count as f64).max(0.0);
        let v = foreign * p.powi(self.k as i32);
        let arg = 1.0 - (-(v * k) / (self.n as f64 * p)).exp();
        arg.powi(self.k as i32).clamp(0.0, 1.0)
    }

    /// Run-length encode the bit array as `value:run,` groups
    ///
    /// The final run is always emitted, so [`decompress`](Self::decompress)
    /// restores all `n` bits.
    pub fn compress(&self) -> String {
        compress::encode_runs(self.iter_bits())
    }

    /// Number of bits in the filter
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of hash functions
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of bits set to 1
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of insertions, decoys included
    pub fn inserted_count(&self) -> u64 {
        self.inserted_count
    }
}

impl MembershipSketch for MembershipStore {
    fn insert(&mut self, item: &[u8]) {
        self.add(item);
    }

    fn contains(&self, item: &[u8]) -> bool {
        self.check(item)
    }

    fn false_positive_rate(&self) -> f64 {
        self.false_positive_probability()
    }

    fn len(&self) -> usize {
        self.inserted_count as usize
    }
}

/// Persisted form of a [`MembershipStore`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStore {
    pub n: usize,
    pub k: usize,
    #[serde(default)]
    pub inserted_count: u64,
    /// Output of [`MembershipStore::compress`]
    pub data: String,
}
