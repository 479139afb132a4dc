//! Per-frame fingerprint extraction

use tracing::trace;

use super::canonical::{canonical_byte_sum, numeric_field_sum, oui_byte_sum};
use super::{Component, FingerprintVector};
use crate::frame::InformationElement;

/// Score a single element
///
/// Returns the fingerprint component the element feeds and its score, or
/// `None` when the element does not take part in fingerprinting or its text
/// is malformed.
pub fn encode(element: &InformationElement) -> Option<(Component, f64)> {
    match element {
        InformationElement::VhtCapabilities { info } => info
            .as_deref()
            .and_then(canonical_byte_sum)
            .map(|sum| (Component::Vht, sum as f64)),
        InformationElement::ExtendedCapabilities { info } => info
            .as_deref()
            .and_then(canonical_byte_sum)
            .map(|sum| (Component::Ext, sum as f64)),
        InformationElement::HtCapabilities { fields } => {
            let sum = numeric_field_sum(fields.iter().map(|(_, v)| v.as_str()));
            Some((Component::Ht, sum as f64))
        }
        InformationElement::VendorSpecific { oui, info } => {
            let info_sum = canonical_byte_sum(info.as_deref()?)?;
            let oui_sum = match oui.as_deref() {
                Some(oui) => oui_byte_sum(oui)?,
                None => 0,
            };
            Some((Component::Vendor, (oui_sum + info_sum) as f64))
        }
        InformationElement::Other { .. } => None,
    }
}

/// Build the fingerprint of one frame from its elements
///
/// VHT, Extended and HT scores keep the last successfully encoded element of
/// their kind. Vendor-Specific scores add up across elements. Components with
/// no usable element stay at [`FingerprintVector::SENTINEL`].
pub fn extract<'a, I>(elements: I) -> FingerprintVector
where
    I: IntoIterator<Item = &'a InformationElement>,
{
    let mut fingerprint = FingerprintVector::default();

    for element in elements {
        match encode(element) {
            Some((Component::Vendor, score)) => fingerprint.accumulate(Component::Vendor, score),
            Some((component, score)) => fingerprint.set(component, score),
            None => {
                if !matches!(element, InformationElement::Other { .. }) {
                    trace!(?element, "element left at sentinel");
                }
            }
        }
    }
    fingerprint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vht(info: &str) -> InformationElement {
        InformationElement::VhtCapabilities {
            info: Some(info.into()),
        }
    }

    fn vendor(oui: Option<&str>, info: &str) -> InformationElement {
        InformationElement::VendorSpecific {
            oui: oui.map(Into::into),
            info: Some(info.into()),
        }
    }

    #[test]
    fn test_encode_components() {
        assert_eq!(encode(&vht("ab")), Some((Component::Vht, 195.0)));
        assert_eq!(
            encode(&InformationElement::ExtendedCapabilities {
                info: Some(r"\x04".into())
            }),
            Some((Component::Ext, 4.0))
        );
        assert_eq!(
            encode(&InformationElement::HtCapabilities {
                fields: vec![("len".into(), "26".into()), ("Rx".into(), "n/a".into())]
            }),
            Some((Component::Ht, 26.0))
        );
        assert_eq!(
            encode(&vendor(Some("Microsoft Corp. (00:50:f2)"), r"\x02")),
            Some((Component::Vendor, (0x50 + 0xf2 + 2) as f64))
        );
        assert_eq!(encode(&InformationElement::Other { id: "SSID".into() }), None);
    }

    #[test]
    fn test_malformed_leaves_sentinel() {
        let elements = [
            vht(r"\xzz"),
            InformationElement::ExtendedCapabilities { info: None },
        ];
        let fp = extract(&elements);

        assert_eq!(fp.vht(), FingerprintVector::SENTINEL);
        assert_eq!(fp.ext(), FingerprintVector::SENTINEL);
        assert_eq!(fp.ht(), FingerprintVector::SENTINEL);
        assert_eq!(fp.vendor(), FingerprintVector::SENTINEL);
    }

    #[test]
    fn test_hex_run_with_literal_tail_leaves_sentinel() {
        let fp = extract(&[vht(r"\x01Z")]);
        assert_eq!(fp.vht(), FingerprintVector::SENTINEL);
        assert_eq!(extract(&[vht(r"\x01ab")]).vht(), (0x01 + 0xab) as f64);
    }

    #[test]
    fn test_malformed_keeps_prior_value() {
        let elements = [vht("ab"), vht(r"\xzz")];
        assert_eq!(extract(&elements).vht(), 195.0);
    }

    #[test]
    fn test_vendor_accumulates() {
        let elements = [vendor(None, r"\x01"), vendor(None, r"\x02"), vendor(None, "\\x")];
        assert_eq!(extract(&elements).vendor(), 3.0);
    }

    #[test]
    fn test_full_frame() {
        let elements = [
            vht("ab"),
            InformationElement::ExtendedCapabilities {
                info: Some(r"'\x00\x00\x08'".into()),
            },
            InformationElement::HtCapabilities {
                fields: vec![("len".into(), "26".into()), ("A_MPDU".into(), "3".into())],
            },
            vendor(Some("00:10:18"), r"\x02\x00"),
            InformationElement::Other { id: "SSID".into() },
        ];

        let fp = extract(&elements);
        assert_eq!(fp.as_array(), &[195.0, 8.0, 29.0, (0x10 + 0x18 + 2) as f64]);
    }
}
