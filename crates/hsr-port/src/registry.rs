//! Copy-on-write port registry.
//!
//! The data path reads the registry on every frame; control operations
//! change it rarely. Readers take an `Arc<PortView>` snapshot without
//! locking. Writers build a complete new view and publish it with a single
//! atomic swap, so a snapshot is always a membership set that existed at
//! some instant.
//!
//! Removal is split in two: [`PortRegistry::remove`] unpublishes the port,
//! and [`PortRegistry::synchronize`] later blocks the control thread until
//! no snapshot or reader still references it. Only then may the device
//! reference be released.

use std::sync::atomic::{fence, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arc_swap::ArcSwap;
use crossbeam::utils::Backoff;
use hsr_types::{IfIndex, MacAddress, PortType};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::trace;

use crate::error::RegistryError;
use crate::port::{Port, PortId, PortStats};

/// Sleep between quiescence checks once spinning has backed off.
const SYNCHRONIZE_SLEEP: Duration = Duration::from_micros(50);

/// An immutable membership view of one group.
#[derive(Debug, Default)]
pub struct PortView {
    generation: u64,
    ports: Vec<Arc<Port>>,
    self_addrs: Vec<MacAddress>,
}

impl PortView {
    fn build(generation: u64, ports: Vec<Arc<Port>>) -> Self {
        let mut self_addrs: Vec<MacAddress> = Vec::with_capacity(ports.len());
        for port in &ports {
            if !self_addrs.contains(&port.mac()) {
                self_addrs.push(port.mac());
            }
        }
        Self {
            generation,
            ports,
            self_addrs,
        }
    }

    /// Monotonic version of this view; bumped on every publish.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Ports in attach order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Port>> {
        self.ports.iter()
    }

    pub fn get(&self, id: PortId) -> Option<&Arc<Port>> {
        self.ports.iter().find(|p| p.id() == id)
    }

    pub fn port_by_ifindex(&self, ifindex: IfIndex) -> Option<&Arc<Port>> {
        self.ports.iter().find(|p| p.ifindex() == ifindex)
    }

    pub fn port_by_type(&self, port_type: PortType) -> Option<&Arc<Port>> {
        self.ports.iter().find(|p| p.port_type() == port_type)
    }

    pub fn master(&self) -> Option<&Arc<Port>> {
        self.port_by_type(PortType::Master)
    }

    pub fn slaves(&self) -> impl Iterator<Item = &Arc<Port>> {
        self.ports.iter().filter(|p| !p.port_type().is_master())
    }

    /// Addresses this node transmits from: the MACs of all member ports.
    pub fn self_addresses(&self) -> &[MacAddress] {
        &self.self_addrs
    }

    pub fn is_self(&self, addr: &MacAddress) -> bool {
        self.self_addrs.contains(addr)
    }

    /// Copies the view into an owned snapshot that holds no port references.
    pub fn to_snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            generation: self.generation,
            ports: self.ports.iter().map(|p| PortInfo::from_port(p)).collect(),
            self_addrs: self.self_addrs.clone(),
        }
    }
}

/// A member port as seen at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub id: PortId,
    pub port_type: PortType,
    pub ifindex: IfIndex,
    pub name: String,
    pub mac: MacAddress,
    pub stats: PortStats,
}

impl PortInfo {
    fn from_port(port: &Port) -> Self {
        Self {
            id: port.id(),
            port_type: port.port_type(),
            ifindex: port.ifindex(),
            name: port.name().to_string(),
            mac: port.mac(),
            stats: port.stats(),
        }
    }
}

/// Owned copy of a group's membership.
///
/// Unlike [`PortView`] it can be held for any length of time without
/// delaying detach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    generation: u64,
    ports: Vec<PortInfo>,
    self_addrs: Vec<MacAddress>,
}

impl GroupSnapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Ports in attach order.
    pub fn iter(&self) -> impl Iterator<Item = &PortInfo> {
        self.ports.iter()
    }

    pub fn get(&self, id: PortId) -> Option<&PortInfo> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn port_by_ifindex(&self, ifindex: IfIndex) -> Option<&PortInfo> {
        self.ports.iter().find(|p| p.ifindex == ifindex)
    }

    pub fn port_by_type(&self, port_type: PortType) -> Option<&PortInfo> {
        self.ports.iter().find(|p| p.port_type == port_type)
    }

    pub fn master(&self) -> Option<&PortInfo> {
        self.port_by_type(PortType::Master)
    }

    pub fn slaves(&self) -> impl Iterator<Item = &PortInfo> {
        self.ports.iter().filter(|p| !p.port_type.is_master())
    }

    pub fn self_addresses(&self) -> &[MacAddress] {
        &self.self_addrs
    }

    pub fn is_self(&self, addr: &MacAddress) -> bool {
        self.self_addrs.contains(addr)
    }
}

/// Concurrent container of a group's ports.
pub struct PortRegistry {
    view: ArcSwap<PortView>,
    writer: Mutex<()>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self {
            view: ArcSwap::from_pointee(PortView::default()),
            writer: Mutex::new(()),
        }
    }

    /// Returns the current membership view.
    ///
    /// Holding the snapshot delays [`PortRegistry::synchronize`] for every
    /// port it contains, so data-path readers drop it before returning.
    #[inline]
    pub fn snapshot(&self) -> Arc<PortView> {
        self.view.load_full()
    }

    /// Publishes a view with `port` appended.
    pub fn insert(&self, port: Arc<Port>) -> Result<(), RegistryError> {
        let _writer = self.writer.lock();
        let current = self.view.load_full();

        if current.port_by_ifindex(port.ifindex()).is_some() {
            return Err(RegistryError::AlreadyMember(port.ifindex()));
        }
        if current.port_by_type(port.port_type()).is_some() {
            return Err(RegistryError::TypeBusy(port.port_type()));
        }

        let mut ports = current.ports.clone();
        ports.push(port);
        let next = PortView::build(current.generation + 1, ports);
        trace!(generation = next.generation, ports = next.len(), "publishing port view");
        self.view.store(Arc::new(next));
        Ok(())
    }

    /// Publishes a view without the port and returns it.
    ///
    /// In-flight readers may still hold the port; call
    /// [`PortRegistry::synchronize`] before releasing what it borrows.
    pub fn remove(&self, id: PortId) -> Result<Arc<Port>, RegistryError> {
        let _writer = self.writer.lock();
        let current = self.view.load_full();

        let pos = current
            .ports
            .iter()
            .position(|p| p.id() == id)
            .ok_or(RegistryError::NotFound(id))?;

        let mut ports = current.ports.clone();
        let removed = ports.remove(pos);
        let next = PortView::build(current.generation + 1, ports);
        trace!(generation = next.generation, ports = next.len(), "publishing port view");
        self.view.store(Arc::new(next));
        Ok(removed)
    }

    /// Blocks until `port` is referenced only by the caller.
    ///
    /// Every snapshot taken before the port was removed holds a reference to
    /// it, as does every reader that resolved a frame to it. New snapshots
    /// cannot reach it, so the count only goes down.
    pub fn synchronize(&self, port: &Arc<Port>) {
        let backoff = Backoff::new();
        while Arc::strong_count(port) > 1 {
            if backoff.is_completed() {
                thread::sleep(SYNCHRONIZE_SLEEP);
            } else {
                backoff.snooze();
            }
        }
        // Pairs with the release decrement of the last reader's drop.
        fence(Ordering::Acquire);
    }

    /// Generation of the currently published view.
    pub fn generation(&self) -> u64 {
        self.view.load().generation
    }
}

impl Default for PortRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Weak;

    fn port(id: u64, ty: PortType, ifindex: u32) -> Arc<Port> {
        Arc::new(Port::new(
            PortId::new(id),
            ty,
            IfIndex::new(ifindex),
            format!("eth{}", ifindex),
            MacAddress::new([0x02, 0, 0, 0, 0, ifindex as u8]),
            Weak::new(),
        ))
    }

    #[test]
    fn test_insert_and_lookup() {
        let registry = PortRegistry::new();
        registry.insert(port(1, PortType::Master, 10)).unwrap();
        registry.insert(port(2, PortType::SlaveA, 11)).unwrap();

        let view = registry.snapshot();
        assert_eq!(view.generation(), 2);
        assert_eq!(view.len(), 2);
        assert_eq!(view.master().unwrap().id(), PortId::new(1));
        assert_eq!(view.slaves().count(), 1);
        assert_eq!(
            view.port_by_ifindex(IfIndex::new(11)).unwrap().port_type(),
            PortType::SlaveA
        );
        assert!(view.is_self(&MacAddress::new([0x02, 0, 0, 0, 0, 11])));
    }

    #[test]
    fn test_insert_duplicate_interface() {
        let registry = PortRegistry::new();
        registry.insert(port(1, PortType::SlaveA, 10)).unwrap();
        let err = registry.insert(port(2, PortType::SlaveB, 10)).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyMember(IfIndex::new(10)));
        assert_eq!(registry.snapshot().len(), 1);
        assert_eq!(registry.generation(), 1);
    }

    #[test]
    fn test_insert_duplicate_type() {
        let registry = PortRegistry::new();
        registry.insert(port(1, PortType::SlaveA, 10)).unwrap();
        let err = registry.insert(port(2, PortType::SlaveA, 11)).unwrap_err();
        assert_eq!(err, RegistryError::TypeBusy(PortType::SlaveA));
    }

    #[test]
    fn test_remove_not_found() {
        let registry = PortRegistry::new();
        let err = registry.remove(PortId::new(9)).unwrap_err();
        assert_eq!(err, RegistryError::NotFound(PortId::new(9)));
    }

    #[test]
    fn test_old_snapshot_unchanged_by_remove() {
        let registry = PortRegistry::new();
        registry.insert(port(1, PortType::Master, 10)).unwrap();
        registry.insert(port(2, PortType::SlaveA, 11)).unwrap();

        let before = registry.snapshot();
        let removed = registry.remove(PortId::new(2)).unwrap();

        assert_eq!(before.len(), 2);
        assert!(before.get(removed.id()).is_some());
        assert_eq!(registry.snapshot().len(), 1);
        assert!(registry.snapshot().get(removed.id()).is_none());
        assert!(!registry.snapshot().is_self(&removed.mac()));
    }

    #[test]
    fn test_synchronize_waits_for_snapshot() {
        let registry = Arc::new(PortRegistry::new());
        registry.insert(port(1, PortType::SlaveA, 10)).unwrap();

        let snapshot = registry.snapshot();
        let removed = registry.remove(PortId::new(1)).unwrap();

        let reader = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let seen = snapshot.len();
            drop(snapshot);
            seen
        });

        registry.synchronize(&removed);
        assert_eq!(Arc::strong_count(&removed), 1);
        assert_eq!(reader.join().unwrap(), 1);
    }

    #[test]
    fn test_owned_snapshot_does_not_pin_ports() {
        let registry = PortRegistry::new();
        registry.insert(port(1, PortType::Master, 10)).unwrap();
        registry.insert(port(2, PortType::SlaveA, 11)).unwrap();

        let snapshot = registry.snapshot().to_snapshot();
        let removed = registry.remove(PortId::new(2)).unwrap();
        // Returns immediately: the copy holds no reference to the port.
        registry.synchronize(&removed);

        assert_eq!(snapshot.generation(), 2);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.master().unwrap().ifindex, IfIndex::new(10));
        let slave = snapshot.get(PortId::new(2)).unwrap();
        assert_eq!(slave.port_type, PortType::SlaveA);
        assert_eq!(slave.name, "eth11");
        assert!(snapshot.is_self(&slave.mac));
    }

    #[test]
    fn test_synchronize_without_readers() {
        let registry = PortRegistry::new();
        registry.insert(port(1, PortType::SlaveA, 10)).unwrap();
        let removed = registry.remove(PortId::new(1)).unwrap();
        registry.synchronize(&removed);
        assert_eq!(Arc::strong_count(&removed), 1);
    }
}
