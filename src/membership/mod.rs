//! Probabilistic address store
//!
//! A Bloom filter over MAC addresses with a quantified deniability guarantee.
//! Besides insertion and membership tests it supports decoy noise, filter
//! intersection, cardinality estimates over single and intersected filters,
//! and a run-length text form for publication.
//!
//! # Example
//!
//! ```
//! use probecount::membership::{estimate_intersection_cardinality, MembershipStore};
//!
//! let mut monday = MembershipStore::new(10_000, 7).unwrap();
//! let mut tuesday = MembershipStore::new(10_000, 7).unwrap();
//! monday.add(b"00:11:22:33:44:55");
//! tuesday.add(b"00:11:22:33:44:55");
//!
//! let both = monday.intersect(&tuesday).unwrap();
//! let shared = estimate_intersection_cardinality(&monday, &tuesday, &both).unwrap();
//! assert!(shared > 0.5 && shared < 1.5);
//! ```

mod bloom;
mod compress;
mod estimate;

pub use bloom::{MembershipStore, PersistedStore};
pub use compress::{decode_runs, encode_runs};
pub use estimate::{estimate_cardinality, estimate_intersection_cardinality};
