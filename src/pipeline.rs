//! Scan, cluster and count in one pass over a capture
//!
//! [`Pipeline::scan`] walks the frames once and fills a [`ScanState`]:
//! globally unique addresses are counted exactly and recorded in the
//! membership store, locally administered ones are fingerprinted.
//! [`Pipeline::finish`] clusters the fingerprints, publishes each cluster's
//! mean address into the store and produces the [`CountReport`].
//!
//! # Example
//!
//! ```
//! use probecount::prelude::*;
//!
//! let config = Config { min_samples: 3, ..Config::default() };
//! let pipeline = Pipeline::from_config(config, ReferenceTable::default()).unwrap();
//! let mut store = pipeline.prepare_store().unwrap();
//!
//! let global = MacAddress::parse("00:11:22:33:44:55").unwrap();
//! let frames = vec![
//!     Frame::probe_request(0.0, -40, global),
//!     Frame::probe_request(1.0, -40, global),
//! ];
//!
//! let report = pipeline.run(frames, &mut store).unwrap();
//! assert_eq!(report.global_devices, 1);
//! assert_eq!(report.local_devices, 0);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::clustering::ClusterEngine;
use crate::config::Config;
use crate::counting::ReferenceTable;
use crate::error::Result;
use crate::fingerprint::{extract, FingerprintDataset};
use crate::frame::{Frame, MacAddress};
use crate::membership::MembershipStore;
use crate::traits::{ClusteringPrimitive, MembershipSketch};

/// Running counters of a scan
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    /// Frames that passed the power and completeness filters
    pub processed_frames: u64,
    /// Processed probe requests from globally unique addresses
    pub global_frames: u64,
    /// Processed probe requests from locally administered addresses
    pub local_frames: u64,
    /// Timestamp of the first input frame, filtered or not
    pub first_timestamp: Option<f64>,
    /// Timestamp of the last processed frame
    pub last_timestamp: Option<f64>,
    /// Distinct globally unique addresses
    pub global_macs: BTreeSet<MacAddress>,
    pub dataset: FingerprintDataset,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds between the first input frame and the last processed one
    pub fn capture_window(&self) -> f64 {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// True when enough processed frames are locally administered to cluster
    pub fn passes_gate(&self, min_percentage: f64) -> bool {
        let processed = self.processed_frames as f64;
        (processed - self.global_frames as f64) > min_percentage * processed
    }
}

/// Outcome of a counting run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountReport {
    /// Distinct globally unique addresses
    pub global_devices: u64,
    /// Estimated devices behind locally administered addresses
    pub local_devices: u64,
    pub total_devices: u64,
    pub processed_frames: u64,
    pub global_frames: u64,
    pub local_frames: u64,
    /// Clusters that survived noise removal
    pub clusters: usize,
    /// Capture window in seconds
    pub capture_window: f64,
    /// Wall-clock seconds spent counting
    pub elapsed: f64,
}

impl fmt::Display for CountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Devices that use globally unique MAC addresses: {}",
            self.global_devices
        )?;
        writeln!(
            f,
            "Devices that use locally administered MAC addresses: {}",
            self.local_devices
        )?;
        writeln!(f, "Total device detected: {}", self.total_devices)?;
        write!(
            f,
            "Frames: {} processed, {} global, {} local in {} clusters over {:.2} s (counted in {:.2} s)",
            self.processed_frames,
            self.global_frames,
            self.local_frames,
            self.clusters,
            self.capture_window,
            self.elapsed
        )
    }
}

/// Device counting pipeline
pub struct Pipeline<P = Box<dyn ClusteringPrimitive>> {
    config: Config,
    reference: ReferenceTable,
    engine: ClusterEngine<P>,
}

impl Pipeline {
    /// Pipeline using the clustering method named in `config`
    pub fn from_config(config: Config, reference: ReferenceTable) -> Result<Self> {
        let primitive = config.clustering_primitive();
        Self::new(config, reference, primitive)
    }
}

impl<P: ClusteringPrimitive> Pipeline<P> {
    pub fn new(config: Config, reference: ReferenceTable, primitive: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reference,
            engine: ClusterEngine::new(primitive),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceTable {
        &self.reference
    }

    /// Fresh store sized by the config, salted with decoy entries
    pub fn prepare_store(&self) -> Result<MembershipStore> {
        info!(
            bits = self.config.store_bits,
            hashes = self.config.store_hashes,
            noise = self.config.initial_noise,
            "creating membership store"
        );
        let mut store = MembershipStore::new(self.config.store_bits, self.config.store_hashes)?;
        store.anonymization_noise(self.config.initial_noise);
        Ok(store)
    }

    /// Scan, cluster and count
    pub fn run<I, S>(&self, frames: I, store: &mut S) -> Result<CountReport>
    where
        I: IntoIterator<Item = Frame>,
        S: MembershipSketch + ?Sized,
    {
        let started = Instant::now();
        let state = self.scan(frames, store);
        self.finish(state, store, started)
    }

    /// Single pass over the frames
    pub fn scan<I, S>(&self, frames: I, store: &mut S) -> ScanState
    where
        I: IntoIterator<Item = Frame>,
        S: MembershipSketch + ?Sized,
    {
        info!("parsing frames");
        let mut state = ScanState::new();

        for frame in frames {
            if state.first_timestamp.is_none() {
                state.first_timestamp = Some(frame.timestamp);
            }

            let rssi = match frame.rssi {
                Some(rssi) if rssi > self.config.power_threshold => rssi,
                Some(_) => continue,
                None => {
                    debug!(timestamp = frame.timestamp, "frame without signal strength skipped");
                    continue;
                }
            };
            let Some(source) = frame.source else {
                debug!(timestamp = frame.timestamp, rssi, "frame without source address skipped");
                continue;
            };

            state.processed_frames += 1;
            state.last_timestamp = Some(frame.timestamp);

            if !frame.is_probe_request() {
                continue;
            }

            if source.is_globally_unique() {
                state.global_frames += 1;
                let key = source.to_string();
                if !store.contains(key.as_bytes()) {
                    store.insert(key.as_bytes());
                }
                state.global_macs.insert(source);
            } else {
                state.local_frames += 1;
                state.dataset.push(extract(&frame.elements), source);
            }
        }

        state
    }

    /// Cluster and count a finished scan
    pub fn finish<S>(&self, state: ScanState, store: &mut S, started: Instant) -> Result<CountReport>
    where
        S: MembershipSketch + ?Sized,
    {
        let global_devices = state.global_macs.len() as u64;
        let capture_window = state.capture_window();

        let (local_devices, clusters) = if state.passes_gate(self.config.min_percentage) {
            info!(fingerprints = state.dataset.len(), "clustering");
            let clusters = self.engine.run(&state.dataset)?;

            for cluster in &clusters {
                store.insert(format!("{}", cluster.mean_address).as_bytes());
            }

            info!(clusters = clusters.len(), "counting devices");
            let counter = self.config.rate_counter();
            let devices = counter.count(&clusters, &self.reference, capture_window)?;
            (devices, clusters.len())
        } else {
            info!(
                processed = state.processed_frames,
                global = state.global_frames,
                "too few locally administered frames, skipping clustering"
            );
            (0, 0)
        };

        let total_devices = global_devices + local_devices;
        let elapsed = started.elapsed().as_secs_f64();
        info!(global_devices, local_devices, total_devices, elapsed, "end counting");

        Ok(CountReport {
            global_devices,
            local_devices,
            total_devices,
            processed_frames: state.processed_frames,
            global_frames: state.global_frames,
            local_frames: state.local_frames,
            clusters,
            capture_window,
            elapsed,
        })
    }
}
