//! 48-bit IEEE 802 MAC address

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// U/L bit of the first octet
const LOCALLY_ADMINISTERED_BIT: u8 = 0x02;

/// A MAC address, displayed as lowercase colon-hex (`aa:bb:cc:dd:ee:ff`)
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Parse a colon-separated hex string such as `"aa:bb:cc:dd:ee:ff"`
    pub fn parse(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 6];
        let mut parts = s.trim().split(':');

        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(|| Error::InvalidMac(s.to_owned()))?;
            if part.is_empty() || part.len() > 2 {
                return Err(Error::InvalidMac(s.to_owned()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| Error::InvalidMac(s.to_owned()))?;
        }
        if parts.next().is_some() {
            return Err(Error::InvalidMac(s.to_owned()));
        }
        Ok(Self(bytes))
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// True if the U/L bit is set (randomized or otherwise locally assigned)
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & LOCALLY_ADMINISTERED_BIT != 0
    }

    /// True for manufacturer-assigned addresses
    pub fn is_globally_unique(&self) -> bool {
        !self.is_locally_administered()
    }

    /// The address as a 48-bit integer
    pub fn as_u64(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
