//! Host interface identifiers and receive-path classifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a network interface in the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IfIndex(u32);

impl IfIndex {
    pub const fn new(index: u32) -> Self {
        IfIndex(index)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for IfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for IfIndex {
    fn from(index: u32) -> Self {
        IfIndex(index)
    }
}

/// Hardware type of a device (ARPHRD_* in Linux terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Ether,
    Loopback,
    None,
    Other(u16),
}

/// How a received frame was addressed, as reported by the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketType {
    /// Addressed to this host.
    #[default]
    Host,
    Broadcast,
    Multicast,
    /// Addressed to another host (seen in promiscuous mode).
    OtherHost,
    /// Locally transmitted frame seen on a tap.
    Outgoing,
    /// Local transmission echoed back into the receive path.
    Loopback,
}
