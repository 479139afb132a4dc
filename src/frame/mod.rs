//! Dissected 802.11 management frames
//!
//! Capture parsing happens upstream; this module only defines the records the
//! pipeline consumes.

mod element;
mod mac;

use serde::{Deserialize, Serialize};

pub use element::{ElementAttributes, InformationElement};
pub use mac::MacAddress;

/// Management frame subtype, as far as counting cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    #[default]
    ProbeRequest,
    Other,
}

/// One dissected frame
///
/// `rssi` and `source` are optional because dissectors do not always recover
/// them; frames missing either are left out of every count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Capture timestamp in seconds
    pub timestamp: f64,
    /// Received signal strength in dBm
    pub rssi: Option<i32>,
    /// Transmitter address
    pub source: Option<MacAddress>,
    #[serde(default)]
    pub kind: FrameKind,
    #[serde(default)]
    pub elements: Vec<InformationElement>,
}

impl Frame {
    /// A probe request with no elements
    pub fn probe_request(timestamp: f64, rssi: i32, source: MacAddress) -> Self {
        Self {
            timestamp,
            rssi: Some(rssi),
            source: Some(source),
            kind: FrameKind::ProbeRequest,
            elements: Vec::new(),
        }
    }

    /// Append an element
    pub fn with_element(mut self, element: InformationElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn is_probe_request(&self) -> bool {
        self.kind == FrameKind::ProbeRequest
    }
}
