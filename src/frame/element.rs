//! Typed information elements
//!
//! Dissectors hand out elements as string-keyed attribute maps. Only four
//! element kinds feed the fingerprint, so they are lifted into typed records
//! with explicit optional fields and everything else collapses into
//! [`InformationElement::Other`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute map for one dissected element, keyed by field name
pub type ElementAttributes = BTreeMap<String, String>;

/// One tagged element of a management frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum InformationElement {
    /// VHT Capabilities, raw `info` text
    VhtCapabilities { info: Option<String> },
    /// Extended Capabilities, raw `info` text
    ExtendedCapabilities { info: Option<String> },
    /// HT Capabilities, every dissected sub-field in order
    HtCapabilities { fields: Vec<(String, String)> },
    /// Vendor Specific, OUI field and raw `info` text
    VendorSpecific {
        oui: Option<String>,
        info: Option<String>,
    },
    /// Any element that does not take part in fingerprinting
    Other { id: String },
}

impl InformationElement {
    /// Lift a dissector attribute map into a typed element
    ///
    /// The element kind comes from the `ID` attribute. Both the standard
    /// "Extended Capabilities" name and scapy's "Extendend Capabilities"
    /// spelling are accepted. Returns `None` when there is no `ID`.
    pub fn from_attributes(attrs: &ElementAttributes) -> Option<Self> {
        let id = attrs.get("ID")?.trim();
        let text = |key: &str| attrs.get(key).cloned();

        let element = match id {
            "VHT Capabilities" => Self::VhtCapabilities { info: text("info") },
            "Extended Capabilities" | "Extendend Capabilities" => {
                Self::ExtendedCapabilities { info: text("info") }
            }
            "HT Capabilities" => Self::HtCapabilities {
                fields: attrs
                    .iter()
                    .filter(|(key, _)| key.as_str() != "ID")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            },
            "Vendor Specific" => Self::VendorSpecific {
                oui: text("oui"),
                info: text("info"),
            },
            other => Self::Other { id: other.to_owned() },
        };
        Some(element)
    }
}
