//! Ingress frame classification.
//!
//! [`classify`] decides what happens to a frame received on a group port.
//! It is a pure function of the frame, the port and the [`ClassifyContext`];
//! counting and forwarding happen in the RX hook.

use hsr_types::{MacAddress, PacketType, PortRole, ProtocolVersion, ETH_P_HSR, ETH_P_PRP};

use crate::frame::Frame;
use crate::port::Port;

/// Outcome of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifyDecision {
    /// Sent by this node; drop it.
    OwnOrigin,
    /// Not redundancy traffic; pass it to normal stack processing.
    Unrelated,
    /// Redundancy traffic with an unusable header; drop it.
    Malformed,
    /// Hand it to the forwarding engine.
    Admit,
}

impl ClassifyDecision {
    /// Returns true if the frame must not reach normal stack processing.
    pub fn consumes(&self) -> bool {
        !matches!(self, ClassifyDecision::Unrelated)
    }
}

/// Group state the classifier depends on.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    /// Addresses this node transmits from.
    pub self_addrs: &'a [MacAddress],
    pub protocol: ProtocolVersion,
    /// Duplication is handled by hardware before frames reach the hook.
    pub rx_offloaded: bool,
}

impl ClassifyContext<'_> {
    fn is_self(&self, addr: &MacAddress) -> bool {
        self.self_addrs.contains(addr)
    }

    fn admits_untagged(&self) -> bool {
        self.protocol.admits_untagged() && !self.rx_offloaded
    }
}

/// Returns true for ethertypes that mark redundancy-tagged frames.
pub fn is_redundancy_ethertype(ethertype: u16) -> bool {
    ethertype == ETH_P_HSR || ethertype == ETH_P_PRP
}

/// Classifies a frame received on `port`.
///
/// Checks run in a fixed order: arrival on the master, loopback echoes,
/// missing header, own origin, protocol eligibility, header placement.
/// The master carries the node's own traffic and is never an ingress
/// point, so nothing arriving there is screened.
pub fn classify(frame: &Frame<'_>, port: &Port, ctx: &ClassifyContext<'_>) -> ClassifyDecision {
    if port.role() == PortRole::Master {
        return ClassifyDecision::Unrelated;
    }

    if frame.pkt_type() == PacketType::Loopback {
        return ClassifyDecision::Unrelated;
    }

    let Some(hdr) = frame.eth_header() else {
        return ClassifyDecision::Unrelated;
    };

    if ctx.is_self(&hdr.source) {
        return ClassifyDecision::OwnOrigin;
    }

    if !is_redundancy_ethertype(hdr.ethertype) && !ctx.admits_untagged() {
        return ClassifyDecision::Unrelated;
    }

    if !frame.header_adjacent() {
        return ClassifyDecision::Malformed;
    }

    ClassifyDecision::Admit
}
