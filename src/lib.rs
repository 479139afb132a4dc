//! # Probecount
//!
//! Wi-Fi device counting from captured probe requests.
//!
//! Devices with manufacturer-assigned addresses are counted exactly. Devices
//! that randomize their address are counted by fingerprinting the
//! capabilities they advertise, clustering the fingerprints and dividing each
//! cluster's frame volume by the probe rate of the closest known device model.
//! Seen addresses go into a Bloom-filter membership store that can be salted
//! with decoys, intersected with other stores and persisted in compressed
//! form.
//!
//! ## Features
//!
//! - **Fingerprinting**: deterministic scores from VHT, Extended, HT and
//!   Vendor-Specific information elements
//! - **Clustering**: pluggable density-based clustering, with DBSCAN and
//!   OPTICS included
//! - **Rate-based counting**: devices per cluster from a reference table of
//!   probe rates
//! - **Membership store**: Bloom filter with cardinality, intersection and
//!   deniability estimators, decoy noise and run-length persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use probecount::prelude::*;
//!
//! let config = Config { min_samples: 5, ..Config::default() };
//! let pipeline = Pipeline::from_config(config, ReferenceTable::default()).unwrap();
//! let mut store = pipeline.prepare_store().unwrap();
//!
//! let phone = MacAddress::parse("00:11:22:33:44:55").unwrap();
//! let mut frames = vec![Frame::probe_request(0.0, -50, phone)];
//! for i in 0..7u8 {
//!     let randomized = MacAddress([0x02, 0xab, 0, 0, 0, i]);
//!     frames.push(
//!         Frame::probe_request(1.0 + f64::from(i), -50, randomized)
//!             .with_element(InformationElement::VhtCapabilities { info: Some("ab".into()) }),
//!     );
//! }
//!
//! let report = pipeline.run(frames, &mut store).unwrap();
//! assert_eq!(report.total_devices, 2);
//! ```
//!
//! ## Membership Store
//!
//! Stores with the same shape can be intersected and their overlap estimated:
//!
//! ```rust
//! use probecount::membership::{estimate_intersection_cardinality, MembershipStore};
//!
//! let mut monday = MembershipStore::new(10_000, 7).unwrap();
//! let mut tuesday = MembershipStore::new(10_000, 7).unwrap();
//! monday.add(b"00:11:22:33:44:55");
//! tuesday.add(b"00:11:22:33:44:55");
//!
//! let both = monday.intersect(&tuesday).unwrap();
//! let overlap = estimate_intersection_cardinality(&monday, &tuesday, &both).unwrap();
//! assert!((overlap - 1.0).abs() < 0.5);
//! ```

pub mod clustering;
pub mod config;
pub mod counting;
pub mod error;
pub mod fingerprint;
pub mod frame;
pub mod math;
pub mod membership;
pub mod pipeline;
pub mod traits;

pub mod prelude {
    pub use crate::traits::*;

    pub use crate::clustering::{Cluster, ClusterEngine, ClusterLabel, ClusterMethod, Dbscan, Optics};
    pub use crate::config::Config;
    pub use crate::counting::{CountingMethod, RateCounter, RateVariant, ReferenceDeviceProfile, ReferenceTable};
    pub use crate::error::{Error, Result};
    pub use crate::fingerprint::{FingerprintDataset, FingerprintVector};
    pub use crate::frame::{Frame, InformationElement, MacAddress};
    pub use crate::math::Metric;
    pub use crate::membership::MembershipStore;
    pub use crate::pipeline::{CountReport, Pipeline};
}

pub use error::{Error, Result};
pub use membership::MembershipStore;
pub use pipeline::{CountReport, Pipeline};
