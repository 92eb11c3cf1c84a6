//! Borrowed view of a received frame.
//!
//! The host delivers frames the way a Linux driver does after
//! `eth_type_trans`: the link-layer header has been recorded at
//! `mac_header` and the data offset already points past it. Nothing here
//! mutates the underlying bytes.

use hsr_types::{MacAddress, PacketType, ETH_ALEN, ETH_HLEN};

/// Decoded Ethernet header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthHeader {
    pub destination: MacAddress,
    pub source: MacAddress,
    pub ethertype: u16,
}

/// A received frame, borrowed for the duration of one hook invocation.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    bytes: &'a [u8],
    mac_header: Option<usize>,
    data_offset: usize,
    pkt_type: PacketType,
}

impl<'a> Frame<'a> {
    /// Wraps a buffer that starts with its Ethernet header, with the header
    /// already pulled the way a receiving driver leaves it.
    pub fn new(bytes: &'a [u8], pkt_type: PacketType) -> Self {
        Self {
            bytes,
            mac_header: Some(0),
            data_offset: ETH_HLEN.min(bytes.len()),
            pkt_type,
        }
    }

    /// Wraps a buffer with explicit header and data positions.
    pub fn with_offsets(
        bytes: &'a [u8],
        mac_header: Option<usize>,
        data_offset: usize,
        pkt_type: PacketType,
    ) -> Self {
        Self {
            bytes,
            mac_header,
            data_offset,
            pkt_type,
        }
    }

    pub fn pkt_type(&self) -> PacketType {
        self.pkt_type
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the Ethernet header, or `None` if no complete header was recorded.
    pub fn eth_header(&self) -> Option<EthHeader> {
        let start = self.mac_header?;
        let hdr = self.bytes.get(start..start.checked_add(ETH_HLEN)?)?;
        Some(EthHeader {
            destination: MacAddress::from_slice(&hdr[..ETH_ALEN])?,
            source: MacAddress::from_slice(&hdr[ETH_ALEN..2 * ETH_ALEN])?,
            ethertype: u16::from_be_bytes([hdr[12], hdr[13]]),
        })
    }

    /// Returns true if pushing the header back onto the data would land
    /// exactly on the recorded link-layer header.
    pub fn header_adjacent(&self) -> bool {
        match self.mac_header {
            Some(start) => self.data_offset.checked_sub(ETH_HLEN) == Some(start),
            None => false,
        }
    }
}
