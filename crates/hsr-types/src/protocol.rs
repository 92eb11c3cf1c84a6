//! Protocol variants and wire constants.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of an Ethernet hardware address.
pub const ETH_ALEN: usize = 6;

/// Length of an Ethernet header (destination, source, ethertype).
pub const ETH_HLEN: usize = 14;

/// Maximum payload of a standard Ethernet frame.
pub const ETH_DATA_LEN: u32 = 1500;

/// Length of the HSR tag inserted after the source address.
pub const HSR_HLEN: u32 = 6;

/// Ethertype of HSR v1 tagged frames.
pub const ETH_P_HSR: u16 = 0x892f;

/// Ethertype of PRP supervision frames and HSR v0 tagged frames.
pub const ETH_P_PRP: u16 = 0x88fb;

/// Redundancy protocol variant negotiated for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// IEC 62439-3:2010 HSR.
    #[serde(rename = "hsr-v0")]
    HsrV0,
    /// IEC 62439-3:2012 HSR (default).
    #[default]
    #[serde(rename = "hsr-v1")]
    HsrV1,
    /// Parallel Redundancy Protocol.
    #[serde(rename = "prp-v1")]
    PrpV1,
}

impl ProtocolVersion {
    /// Returns true if this is one of the HSR variants.
    pub const fn is_hsr(&self) -> bool {
        matches!(self, ProtocolVersion::HsrV0 | ProtocolVersion::HsrV1)
    }

    /// Returns true if frames without a redundancy tag belong to the group.
    ///
    /// PRP carries its redundancy information in a trailer, so plain
    /// Ethernet frames are still redundancy traffic. HSR data frames are
    /// always tagged.
    pub const fn admits_untagged(&self) -> bool {
        matches!(self, ProtocolVersion::PrpV1)
    }

    /// Returns the kernel-style numeric version.
    pub const fn as_u8(&self) -> u8 {
        match self {
            ProtocolVersion::HsrV0 => 0,
            ProtocolVersion::HsrV1 => 1,
            ProtocolVersion::PrpV1 => 3,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtocolVersion::HsrV0 => "hsr-v0",
            ProtocolVersion::HsrV1 => "hsr-v1",
            ProtocolVersion::PrpV1 => "prp-v1",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ProtocolVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hsr-v0" | "0" => Ok(ProtocolVersion::HsrV0),
            "hsr-v1" | "hsr" | "1" => Ok(ProtocolVersion::HsrV1),
            "prp-v1" | "prp" | "3" => Ok(ProtocolVersion::PrpV1),
            _ => Err(ParseError::InvalidProtocolVersion(s.to_string())),
        }
    }
}
