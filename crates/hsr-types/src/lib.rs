//! Common types for HSR/PRP redundancy groups.
//!
//! This crate provides type-safe representations of the primitives shared by
//! the port manager, the ingress classifier and the host stack contract:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`IfIndex`]: host network interface indices
//! - [`PortType`] / [`PortRole`]: a port's slot within a redundancy group
//! - [`ProtocolVersion`]: the negotiated HSR or PRP variant
//! - [`PacketType`] / [`LinkType`]: receive-path classification of devices and frames

mod iface;
mod mac;
mod port;
mod protocol;

pub use iface::{IfIndex, LinkType, PacketType};
pub use mac::MacAddress;
pub use port::{PortRole, PortType};
pub use protocol::{
    ProtocolVersion, ETH_ALEN, ETH_DATA_LEN, ETH_HLEN, ETH_P_HSR, ETH_P_PRP, HSR_HLEN,
};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid port type: {0}")]
    InvalidPortType(String),

    #[error("invalid protocol version: {0}")]
    InvalidProtocolVersion(String),
}
