//! Redundancy group member ports.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Weak;

use hsr_types::{IfIndex, MacAddress, PortRole, PortType};
use serde::Serialize;

use crate::group::{GroupShared, RedundancyGroup};

/// Identifier of a port, unique within its group for the group's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PortId(u64);

impl PortId {
    pub(crate) const fn new(id: u64) -> Self {
        PortId(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port#{}", self.0)
    }
}

/// Point-in-time copy of a port's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortStats {
    /// Frames admitted and handed to the forwarder.
    pub rx: u64,
    /// Malformed frames dropped.
    pub rx_errors: u64,
    /// Frames dropped because this node sent them.
    pub own_rx: u64,
    /// Frames passed to normal stack processing.
    pub passthrough: u64,
}

/// Per-port receive counters. Diagnostic only.
#[derive(Debug, Default)]
pub struct PortCounters {
    rx: AtomicU64,
    rx_errors: AtomicU64,
    own_rx: AtomicU64,
    passthrough: AtomicU64,
}

impl PortCounters {
    pub(crate) fn record_rx(&self) {
        self.rx.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the previous error count.
    pub(crate) fn record_rx_error(&self) -> u64 {
        self.rx_errors.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn record_own_rx(&self) {
        self.own_rx.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_passthrough(&self) {
        self.passthrough.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PortStats {
        PortStats {
            rx: self.rx.load(Ordering::Relaxed),
            rx_errors: self.rx_errors.load(Ordering::Relaxed),
            own_rx: self.own_rx.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
        }
    }
}

/// A device's membership record within one redundancy group.
///
/// Ports are shared between the registry and in-flight readers through
/// `Arc<Port>`. The device itself is borrowed from the host stack.
pub struct Port {
    id: PortId,
    port_type: PortType,
    ifindex: IfIndex,
    name: String,
    mac: MacAddress,
    group: Weak<GroupShared>,
    hook_installed: AtomicBool,
    promiscuous: bool,
    counters: PortCounters,
}

impl Port {
    pub(crate) fn new(
        id: PortId,
        port_type: PortType,
        ifindex: IfIndex,
        name: String,
        mac: MacAddress,
        group: Weak<GroupShared>,
    ) -> Self {
        Self {
            id,
            port_type,
            ifindex,
            name,
            mac,
            group,
            hook_installed: AtomicBool::new(false),
            promiscuous: false,
            counters: PortCounters::default(),
        }
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    pub fn port_type(&self) -> PortType {
        self.port_type
    }

    pub fn role(&self) -> PortRole {
        self.port_type.role()
    }

    pub fn ifindex(&self) -> IfIndex {
        self.ifindex
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// Returns the owning group, if it still exists.
    pub fn group(&self) -> Option<RedundancyGroup> {
        self.group.upgrade().map(RedundancyGroup::from_shared)
    }

    pub fn hook_installed(&self) -> bool {
        self.hook_installed.load(Ordering::Acquire)
    }

    pub(crate) fn set_hook_installed(&self, installed: bool) {
        self.hook_installed.store(installed, Ordering::Release);
    }

    /// Whether attach raised the device's promiscuity.
    pub fn promiscuous(&self) -> bool {
        self.promiscuous
    }

    pub(crate) fn set_promiscuous(&mut self, promiscuous: bool) {
        self.promiscuous = promiscuous;
    }

    pub fn counters(&self) -> &PortCounters {
        &self.counters
    }

    pub fn stats(&self) -> PortStats {
        self.counters.snapshot()
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id)
            .field("port_type", &self.port_type)
            .field("ifindex", &self.ifindex)
            .field("name", &self.name)
            .field("mac", &self.mac)
            .field("hook_installed", &self.hook_installed())
            .field("promiscuous", &self.promiscuous)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_port() -> Port {
        Port::new(
            PortId::new(7),
            PortType::SlaveB,
            IfIndex::new(3),
            "eth1".to_string(),
            "02:00:00:00:00:02".parse().unwrap(),
            Weak::new(),
        )
    }

    #[test]
    fn test_port_accessors() {
        let port = test_port();
        assert_eq!(port.id().to_string(), "port#7");
        assert_eq!(port.role(), PortRole::Slave);
        assert!(!port.hook_installed());
        assert!(port.group().is_none());
    }

    #[test]
    fn test_counters() {
        let port = test_port();
        port.counters().record_rx();
        port.counters().record_rx();
        assert_eq!(port.counters().record_rx_error(), 0);
        assert_eq!(port.counters().record_rx_error(), 1);
        port.counters().record_own_rx();
        port.counters().record_passthrough();

        assert_eq!(
            port.stats(),
            PortStats {
                rx: 2,
                rx_errors: 2,
                own_rx: 1,
                passthrough: 1,
            }
        );
    }
}
