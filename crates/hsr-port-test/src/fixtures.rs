//! Test fixtures: standard devices, frame builders and a ready-made group.

use std::sync::Arc;

use hsr_port::{
    DeviceInfo, Features, Frame, GroupConfig, HookOwner, PortId, RedundancyGroup,
    RxHandlerResult,
};
use hsr_types::{
    IfIndex, LinkType, MacAddress, PacketType, PortType, ETH_ALEN, ETH_HLEN, ETH_P_HSR,
};

use crate::{RecordingForwarder, SimHost};

pub const LOOPBACK_IFINDEX: IfIndex = IfIndex::new(1);
pub const SLAVE_A_IFINDEX: IfIndex = IfIndex::new(2);
pub const SLAVE_B_IFINDEX: IfIndex = IfIndex::new(3);
pub const INTERLINK_IFINDEX: IfIndex = IfIndex::new(4);
pub const MASTER_IFINDEX: IfIndex = IfIndex::new(10);

pub const SLAVE_A_MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x02]);
pub const SLAVE_B_MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x03]);
pub const INTERLINK_MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x04]);
pub const MASTER_MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x0a]);
/// A node elsewhere on the ring.
pub const PEER_MAC: MacAddress = MacAddress::new([0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0x01]);

pub const ETH_P_IP: u16 = 0x0800;

/// Features a typical physical NIC reports.
pub const NIC_FEATURES: Features = Features::from_bits(
    Features::SG.bits() | Features::HW_CSUM.bits() | Features::GSO.bits() | Features::LRO.bits(),
);

/// A plain Ethernet device eligible for attachment.
pub fn ether_device(ifindex: IfIndex, name: &str, mac: MacAddress) -> DeviceInfo {
    DeviceInfo {
        ifindex,
        name: name.to_string(),
        link_type: LinkType::Ether,
        addr_len: ETH_ALEN as u8,
        mac,
        mtu: 1500,
        features: NIC_FEATURES,
        loopback: false,
        vlan: false,
        dont_bridge: false,
        redundancy_master: false,
        rx_hook: HookOwner::None,
    }
}

/// The virtual device fronting a redundancy group.
pub fn master_device(ifindex: IfIndex, name: &str, mac: MacAddress) -> DeviceInfo {
    DeviceInfo {
        redundancy_master: true,
        features: Features::ALL,
        ..ether_device(ifindex, name, mac)
    }
}

pub fn loopback_device(ifindex: IfIndex) -> DeviceInfo {
    DeviceInfo {
        link_type: LinkType::Loopback,
        loopback: true,
        mtu: 65536,
        ..ether_device(ifindex, "lo", MacAddress::ZERO)
    }
}

/// Builds an Ethernet frame with `payload_len` zero bytes after the header.
pub fn eth_frame(
    destination: MacAddress,
    source: MacAddress,
    ethertype: u16,
    payload_len: usize,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ETH_HLEN + payload_len);
    bytes.extend_from_slice(destination.as_bytes());
    bytes.extend_from_slice(source.as_bytes());
    bytes.extend_from_slice(&ethertype.to_be_bytes());
    bytes.resize(ETH_HLEN + payload_len, 0);
    bytes
}

/// An HSR-tagged broadcast frame carrying IPv4.
pub fn hsr_frame(source: MacAddress) -> Vec<u8> {
    let mut bytes = eth_frame(MacAddress::BROADCAST, source, ETH_P_HSR, 0);
    // path/LSDU size, sequence number, encapsulated ethertype
    bytes.extend_from_slice(&[0x00, 0x40, 0x00, 0x01]);
    bytes.extend_from_slice(&ETH_P_IP.to_be_bytes());
    bytes.resize(bytes.len() + 46, 0);
    bytes
}

/// An untagged IPv4 frame, as PRP nodes send.
pub fn ipv4_frame(source: MacAddress) -> Vec<u8> {
    eth_frame(MacAddress::BROADCAST, source, ETH_P_IP, 46)
}

pub fn host_frame(bytes: &[u8]) -> Frame<'_> {
    Frame::new(bytes, PacketType::Host)
}

/// A group over a [`SimHost`] populated with the standard devices.
pub struct TestGroup {
    pub host: Arc<SimHost>,
    pub forwarder: Arc<RecordingForwarder>,
    pub group: RedundancyGroup,
}

impl TestGroup {
    pub fn new(config: GroupConfig) -> Self {
        Self::with_forwarder(config, RecordingForwarder::new())
    }

    pub fn with_forwarder(config: GroupConfig, forwarder: RecordingForwarder) -> Self {
        let host = Arc::new(SimHost::new());
        host.add_device(loopback_device(LOOPBACK_IFINDEX));
        host.add_device(ether_device(SLAVE_A_IFINDEX, "eth0", SLAVE_A_MAC));
        host.add_device(ether_device(SLAVE_B_IFINDEX, "eth1", SLAVE_B_MAC));
        host.add_device(ether_device(INTERLINK_IFINDEX, "eth2", INTERLINK_MAC));
        host.add_device(master_device(MASTER_IFINDEX, &config.name, MASTER_MAC));

        let forwarder = Arc::new(forwarder);
        let group = RedundancyGroup::new(config, host.clone(), forwarder.clone())
            .expect("valid test config");
        Self {
            host,
            forwarder,
            group,
        }
    }

    /// Attaches the master and both slaves.
    pub fn attach_ring(&self) -> (PortId, PortId, PortId) {
        let master = self
            .group
            .attach(MASTER_IFINDEX, PortType::Master)
            .expect("attach master");
        let a = self
            .group
            .attach(SLAVE_A_IFINDEX, PortType::SlaveA)
            .expect("attach slave A");
        let b = self
            .group
            .attach(SLAVE_B_IFINDEX, PortType::SlaveB)
            .expect("attach slave B");
        (master, a, b)
    }

    pub fn deliver(&self, ifindex: IfIndex, bytes: &[u8]) -> RxHandlerResult {
        self.host.deliver(ifindex, &host_frame(bytes))
    }
}
