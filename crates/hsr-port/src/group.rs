//! Redundancy groups and the attach/detach protocol.
//!
//! Attach and detach are serialized per group by the control lock, which
//! also guards the derived MTU and feature state. Neither ever blocks the
//! data path; only detach waits, on its own thread, for readers of the port
//! it removed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hsr_types::{IfIndex, LinkType, PortType, ETH_ALEN, ETH_DATA_LEN, HSR_HLEN};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::GroupConfig;
use crate::error::{
    AttachError, AttachResult, ConfigError, DetachError, Ineligibility, RegistryError,
};
use crate::hook::{Forwarder, PortHook};
use crate::host::{DeviceInfo, Features, HookOwner, HostStack};
use crate::port::{Port, PortId, PortStats};
use crate::registry::{GroupSnapshot, PortRegistry, PortView};
use crate::rollback::Rollback;

/// Values pushed to the master device whenever membership changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedState {
    pub mtu: u32,
    pub features: Features,
}

impl DerivedState {
    fn empty(mask: Features) -> Self {
        Self {
            mtu: ETH_DATA_LEN - HSR_HLEN,
            features: mask,
        }
    }
}

pub(crate) struct GroupShared {
    pub(crate) config: GroupConfig,
    pub(crate) registry: PortRegistry,
    pub(crate) host: Arc<dyn HostStack>,
    pub(crate) forwarder: Arc<dyn Forwarder>,
    control: Mutex<DerivedState>,
    next_port_id: AtomicU64,
}

impl Drop for GroupShared {
    fn drop(&mut self) {
        let remaining = self.registry.snapshot().len();
        if remaining > 0 {
            warn!(
                group = %self.config.name,
                remaining,
                "redundancy group dropped without teardown"
            );
        }
    }
}

/// Rejects devices that can never carry redundancy traffic.
pub fn check_device_eligible(info: &DeviceInfo) -> AttachResult<()> {
    let reason = if info.loopback || info.link_type == LinkType::Loopback {
        Some(Ineligibility::Loopback)
    } else if info.link_type != LinkType::Ether {
        Some(Ineligibility::NotEthernet)
    } else if usize::from(info.addr_len) != ETH_ALEN {
        Some(Ineligibility::AddressLength(info.addr_len))
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(AttachError::Ineligible {
            ifname: info.name.clone(),
            reason,
        });
    }

    if info.redundancy_master {
        return Err(AttachError::NestedGroup(info.name.clone()));
    }
    if info.rx_hook == HookOwner::Redundancy {
        return Err(AttachError::AlreadyHooked(info.name.clone()));
    }
    if info.vlan {
        return Err(AttachError::VlanUnsupported(info.name.clone()));
    }
    if info.dont_bridge {
        return Err(AttachError::BridgingUnsupported(info.name.clone()));
    }
    Ok(())
}

/// Rejects devices that cannot front a redundancy group.
pub fn check_master_eligible(info: &DeviceInfo) -> AttachResult<()> {
    if info.rx_hook == HookOwner::Redundancy {
        return Err(AttachError::AlreadyHooked(info.name.clone()));
    }
    if !info.redundancy_master {
        return Err(AttachError::NotRedundancyMaster(info.name.clone()));
    }
    Ok(())
}

/// One redundancy group: a master and its slave ports.
///
/// Cloning yields another handle to the same group.
#[derive(Clone)]
pub struct RedundancyGroup {
    shared: Arc<GroupShared>,
}

impl RedundancyGroup {
    pub fn new(
        config: GroupConfig,
        host: Arc<dyn HostStack>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let derived = DerivedState::empty(config.features_mask);
        Ok(Self {
            shared: Arc::new(GroupShared {
                config,
                registry: PortRegistry::new(),
                host,
                forwarder,
                control: Mutex::new(derived),
                next_port_id: AtomicU64::new(1),
            }),
        })
    }

    pub(crate) fn from_shared(shared: Arc<GroupShared>) -> Self {
        Self { shared }
    }

    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    pub fn config(&self) -> &GroupConfig {
        &self.shared.config
    }

    /// Copy of the current membership.
    pub fn ports(&self) -> GroupSnapshot {
        self.shared.registry.snapshot().to_snapshot()
    }

    pub fn port_id(&self, port_type: PortType) -> Option<PortId> {
        self.shared
            .registry
            .snapshot()
            .port_by_type(port_type)
            .map(|p| p.id())
    }

    pub fn is_member(&self, ifindex: IfIndex) -> bool {
        self.shared
            .registry
            .snapshot()
            .port_by_ifindex(ifindex)
            .is_some()
    }

    /// The MTU and features last pushed to the master.
    pub fn derived(&self) -> DerivedState {
        *self.shared.control.lock()
    }

    /// Counters of every member port, in attach order.
    pub fn stats(&self) -> Vec<(PortType, PortStats)> {
        self.shared
            .registry
            .snapshot()
            .iter()
            .map(|p| (p.port_type(), p.stats()))
            .collect()
    }

    /// Attaches a device to the group.
    ///
    /// On error the device is left exactly as it was.
    #[instrument(skip(self), fields(group = %self.shared.config.name))]
    pub fn attach(&self, ifindex: IfIndex, port_type: PortType) -> AttachResult<PortId> {
        let shared = &self.shared;
        let mut derived = shared.control.lock();

        let info = shared
            .host
            .device_info(ifindex)
            .map_err(|source| AttachError::DeviceLookup { source })?;

        {
            let view = shared.registry.snapshot();
            if view.port_by_ifindex(ifindex).is_some() {
                return Err(AttachError::AlreadyMember(info.name));
            }
            if view.port_by_type(port_type).is_some() {
                return Err(AttachError::PortTypeBusy(port_type));
            }
            if port_type.is_master() {
                check_master_eligible(&info)?;
            } else {
                check_device_eligible(&info)?;
                if view.master().is_none() {
                    return Err(AttachError::NoMaster);
                }
            }
        }

        let id = PortId::new(shared.next_port_id.fetch_add(1, Ordering::Relaxed));
        let mut port = Port::new(
            id,
            port_type,
            ifindex,
            info.name.clone(),
            info.mac,
            Arc::downgrade(shared),
        );

        let host = shared.host.as_ref();
        let mut rollback = Rollback::new();

        // A master device fronts exactly one group.
        if port_type.is_master() {
            host.claim_master(ifindex)
                .map_err(|source| AttachError::MasterClaimed {
                    ifname: info.name.clone(),
                    source,
                })?;
            rollback.push("claim", move || host.release_master(ifindex));
        }

        host.hold(ifindex)
            .map_err(|source| AttachError::ReferenceFailed {
                ifname: info.name.clone(),
                source,
            })?;
        rollback.push("hold", move || host.put(ifindex));

        if !port_type.is_master() {
            self.setup_slave(&info, &mut port, &mut rollback)?;
        }

        // Checked above under the control lock, so this cannot collide.
        shared
            .registry
            .insert(Arc::new(port))
            .map_err(|e| match e {
                RegistryError::TypeBusy(ty) => AttachError::PortTypeBusy(ty),
                RegistryError::AlreadyMember(_) | RegistryError::NotFound(_) => {
                    AttachError::AlreadyMember(info.name.clone())
                }
            })?;
        rollback.commit();

        let view = shared.registry.snapshot();
        *derived = self.recompute_derived(&view);
        self.propagate_derived(&view, *derived);

        info!(
            port = %id,
            ifname = %info.name,
            %port_type,
            mtu = derived.mtu,
            "attached port"
        );
        Ok(id)
    }

    /// Promiscuity, ingress hook and LRO for a slave device.
    fn setup_slave<'a>(
        &'a self,
        info: &DeviceInfo,
        port: &mut Port,
        rollback: &mut Rollback<'a>,
    ) -> AttachResult<()> {
        let host = self.shared.host.as_ref();
        let ifindex = info.ifindex;

        // Offloaded duplication happens before frames reach this host.
        if !self.shared.config.rx_offloaded {
            host.set_promiscuity(ifindex, 1)
                .map_err(|source| AttachError::PromiscuityFailed {
                    ifname: info.name.clone(),
                    source,
                })?;
            port.set_promiscuous(true);
            let ifname = info.name.clone();
            rollback.push("promiscuity", move || {
                if let Err(e) = host.set_promiscuity(ifindex, -1) {
                    warn!(ifname = %ifname, error = %e, "failed to restore promiscuity");
                }
            });
        }

        let hook = Arc::new(PortHook::new(Arc::downgrade(&self.shared), ifindex));
        host.register_rx_handler(ifindex, hook)
            .map_err(|source| AttachError::HookInstallFailed {
                ifname: info.name.clone(),
                source,
            })?;
        port.set_hook_installed(true);
        let ifname = info.name.clone();
        rollback.push("rx_handler", move || {
            if let Err(e) = host.unregister_rx_handler(ifindex) {
                warn!(ifname = %ifname, error = %e, "failed to remove ingress hook");
            }
        });

        // Coalesced frames would break the header placement the classifier checks.
        host.disable_lro(ifindex);
        debug!(ifname = %info.name, "slave device set up");
        Ok(())
    }

    /// Detaches a port.
    ///
    /// Only the preconditions can fail; once removal starts it completes,
    /// with cleanup failures logged.
    #[instrument(skip(self), fields(group = %self.shared.config.name, port = %id))]
    pub fn detach(&self, id: PortId) -> Result<(), DetachError> {
        let mut derived = self.shared.control.lock();
        self.detach_locked(&mut derived, id)
    }

    /// Detaches every slave, then the master.
    #[instrument(skip(self), fields(group = %self.shared.config.name))]
    pub fn teardown(&self) {
        let mut derived = self.shared.control.lock();

        let (slaves, master): (Vec<PortId>, Option<PortId>) = {
            let view = self.shared.registry.snapshot();
            (
                view.slaves().map(|p| p.id()).collect(),
                view.master().map(|p| p.id()),
            )
        };

        for id in slaves.into_iter().chain(master) {
            if let Err(e) = self.detach_locked(&mut derived, id) {
                warn!(port = %id, error = %e, "teardown skipped port");
            }
        }
        info!("group torn down");
    }

    fn detach_locked(&self, derived: &mut DerivedState, id: PortId) -> Result<(), DetachError> {
        let shared = &self.shared;
        let host = shared.host.as_ref();

        let is_master = {
            let view = shared.registry.snapshot();
            let port = view.get(id).ok_or(DetachError::NotMember(id))?;
            let is_master = port.port_type().is_master();
            let slaves = view.slaves().count();
            if is_master && slaves > 0 {
                return Err(DetachError::MasterInUse { slaves });
            }
            is_master
        };

        let port = shared
            .registry
            .remove(id)
            .map_err(|_| DetachError::NotMember(id))?;

        // Removing the master tears the group down; there is no one to tell.
        if !is_master {
            let view = shared.registry.snapshot();
            *derived = self.recompute_derived(&view);
            self.propagate_derived(&view, *derived);
        } else {
            *derived = DerivedState::empty(shared.config.features_mask);
        }

        if port.hook_installed() {
            if let Err(e) = host.unregister_rx_handler(port.ifindex()) {
                warn!(ifname = %port.name(), error = %e, "failed to remove ingress hook");
            }
            port.set_hook_installed(false);
        }

        if port.promiscuous() {
            if let Err(e) = host.set_promiscuity(port.ifindex(), -1) {
                warn!(ifname = %port.name(), error = %e, "failed to restore promiscuity");
            }
        }

        debug!(ifname = %port.name(), "waiting for readers");
        shared.registry.synchronize(&port);

        if is_master {
            host.release_master(port.ifindex());
        }
        host.put(port.ifindex());
        info!(ifname = %port.name(), port_type = %port.port_type(), "detached port");
        Ok(())
    }

    /// Smallest slave MTU less the tag overhead, and the features every
    /// slave supports.
    fn recompute_derived(&self, view: &PortView) -> DerivedState {
        let mut mtu = ETH_DATA_LEN;
        let mut features = self.shared.config.features_mask;

        for slave in view.slaves() {
            match self.shared.host.device_info(slave.ifindex()) {
                Ok(info) => {
                    mtu = mtu.min(info.mtu);
                    features = features & info.features;
                }
                Err(e) => {
                    warn!(ifname = %slave.name(), error = %e, "slave vanished during recompute");
                }
            }
        }

        DerivedState {
            mtu: mtu.saturating_sub(HSR_HLEN),
            features,
        }
    }

    fn propagate_derived(&self, view: &PortView, derived: DerivedState) {
        let Some(master) = view.master() else {
            return;
        };
        let host = self.shared.host.as_ref();
        host.set_features(master.ifindex(), derived.features);
        if let Err(e) = host.set_mtu(master.ifindex(), derived.mtu) {
            warn!(ifname = %master.name(), mtu = derived.mtu, error = %e, "failed to set master MTU");
        }
    }
}

impl fmt::Debug for RedundancyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedundancyGroup")
            .field("config", &self.shared.config)
            .field("ports", &self.shared.registry.snapshot().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::hook::DiscardForwarder;
    use crate::host::MockHostStack;
    use hsr_types::{MacAddress, ProtocolVersion};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    const MASTER: IfIndex = IfIndex::new(1);
    const ETH0: IfIndex = IfIndex::new(2);
    const ETH1: IfIndex = IfIndex::new(3);
    const LO: IfIndex = IfIndex::new(9);

    fn device(ifindex: IfIndex) -> DeviceInfo {
        let idx = ifindex.as_u32();
        DeviceInfo {
            ifindex,
            name: match idx {
                1 => "hsr0".to_string(),
                9 => "lo".to_string(),
                _ => format!("eth{}", idx - 2),
            },
            link_type: if idx == 9 { LinkType::Loopback } else { LinkType::Ether },
            addr_len: 6,
            mac: MacAddress::new([0x02, 0, 0, 0, 0, idx as u8]),
            mtu: if idx == 3 { 1400 } else { 1500 },
            features: Features::SG | Features::GSO,
            loopback: idx == 9,
            vlan: false,
            dont_bridge: false,
            redundancy_master: idx == 1,
            rx_hook: HookOwner::None,
        }
    }

    fn group(mock: MockHostStack) -> RedundancyGroup {
        RedundancyGroup::new(
            GroupConfig::new("hsr0", ProtocolVersion::HsrV1),
            Arc::new(mock),
            Arc::new(DiscardForwarder),
        )
        .unwrap()
    }

    fn permissive(mock: &mut MockHostStack) {
        mock.expect_device_info().returning(|idx| Ok(device(idx)));
        mock.expect_claim_master().returning(|_| Ok(()));
        mock.expect_release_master().return_const(());
        mock.expect_hold().returning(|_| Ok(()));
        mock.expect_put().return_const(());
        mock.expect_set_promiscuity().returning(|_, _| Ok(()));
        mock.expect_register_rx_handler().returning(|_, _| Ok(()));
        mock.expect_unregister_rx_handler().returning(|_| Ok(()));
        mock.expect_disable_lro().return_const(());
        mock.expect_set_features().return_const(());
    }

    #[test]
    fn test_loopback_rejected_without_side_effects() {
        let mut mock = MockHostStack::new();
        mock.expect_device_info().returning(|idx| Ok(device(idx)));
        mock.expect_claim_master()
            .with(eq(MASTER))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_hold().with(eq(MASTER)).times(1).returning(|_| Ok(()));
        mock.expect_set_features().return_const(());
        mock.expect_set_mtu().returning(|_, _| Ok(()));
        let group = group(mock);
        group.attach(MASTER, PortType::Master).unwrap();

        let before = group.ports().generation();
        let err = group.attach(LO, PortType::SlaveA).unwrap_err();
        assert!(matches!(
            err,
            AttachError::Ineligible {
                reason: Ineligibility::Loopback,
                ..
            }
        ));
        assert!(err.is_rejection());
        assert_eq!(group.ports().generation(), before);
        assert_eq!(group.ports().len(), 1);
    }

    #[test]
    fn test_claimed_master_rejected_before_hold() {
        let mut mock = MockHostStack::new();
        mock.expect_device_info().returning(|idx| Ok(device(idx)));
        mock.expect_claim_master()
            .with(eq(MASTER))
            .times(1)
            .returning(|_| Err(HostError::Busy("hsr0".to_string())));
        let group = group(mock);

        let err = group.attach(MASTER, PortType::Master).unwrap_err();
        assert!(matches!(err, AttachError::MasterClaimed { .. }));
        assert!(err.is_rejection());
        assert!(group.ports().is_empty());
    }

    #[test]
    fn test_plain_device_cannot_be_master() {
        let mut mock = MockHostStack::new();
        mock.expect_device_info().returning(|idx| Ok(device(idx)));
        let group = group(mock);
        assert!(matches!(
            group.attach(ETH0, PortType::Master),
            Err(AttachError::NotRedundancyMaster(_))
        ));

        let mut info = device(MASTER);
        info.rx_hook = HookOwner::Redundancy;
        assert!(matches!(
            check_master_eligible(&info),
            Err(AttachError::AlreadyHooked(_))
        ));
        assert!(check_master_eligible(&device(MASTER)).is_ok());
    }

    #[test]
    fn test_master_detach_releases_claim_before_put() {
        let mut mock = MockHostStack::new();
        let mut seq = Sequence::new();
        mock.expect_device_info().returning(|idx| Ok(device(idx)));
        mock.expect_set_features().return_const(());
        mock.expect_set_mtu().returning(|_, _| Ok(()));
        mock.expect_claim_master()
            .with(eq(MASTER))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_hold()
            .with(eq(MASTER))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_release_master()
            .with(eq(MASTER))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        mock.expect_put()
            .with(eq(MASTER))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let group = group(mock);
        let master = group.attach(MASTER, PortType::Master).unwrap();
        group.detach(master).unwrap();
        assert!(group.ports().is_empty());
    }

    #[test]
    fn test_slave_requires_master() {
        let mut mock = MockHostStack::new();
        mock.expect_device_info().returning(|idx| Ok(device(idx)));
        let group = group(mock);
        assert!(matches!(
            group.attach(ETH0, PortType::SlaveA),
            Err(AttachError::NoMaster)
        ));
    }

    #[test]
    fn test_hook_failure_rolls_back_in_order() {
        let mut mock = MockHostStack::new();
        let mut seq = Sequence::new();
        mock.expect_device_info().returning(|idx| Ok(device(idx)));
        mock.expect_set_features().return_const(());
        mock.expect_set_mtu().returning(|_, _| Ok(()));
        mock.expect_claim_master()
            .with(eq(MASTER))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_hold()
            .with(eq(MASTER))
            .times(1)
            .returning(|_| Ok(()));

        mock.expect_hold()
            .with(eq(ETH0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_set_promiscuity()
            .with(eq(ETH0), eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_register_rx_handler()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(HostError::Busy("eth0".to_string())));
        mock.expect_set_promiscuity()
            .with(eq(ETH0), eq(-1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_put()
            .with(eq(ETH0))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let group = group(mock);
        group.attach(MASTER, PortType::Master).unwrap();
        let err = group.attach(ETH0, PortType::SlaveA).unwrap_err();
        assert!(matches!(err, AttachError::HookInstallFailed { .. }));
        assert!(!err.is_rejection());
        assert!(!group.is_member(ETH0));
    }

    #[test]
    fn test_attach_propagates_min_mtu() {
        let mut mock = MockHostStack::new();
        permissive(&mut mock);
        mock.expect_set_mtu()
            .with(eq(MASTER), eq(1494))
            .times(2)
            .returning(|_, _| Ok(()));
        mock.expect_set_mtu()
            .with(eq(MASTER), eq(1394))
            .times(1)
            .returning(|_, _| Ok(()));

        let group = group(mock);
        group.attach(MASTER, PortType::Master).unwrap();
        group.attach(ETH0, PortType::SlaveA).unwrap();
        group.attach(ETH1, PortType::SlaveB).unwrap();
        assert_eq!(group.derived().mtu, 1394);
        assert_eq!(group.derived().features, Features::SG | Features::GSO);
    }

    #[test]
    fn test_detach_last_slave_propagates_once() {
        let mut mock = MockHostStack::new();
        permissive(&mut mock);
        // master attach, slave attach, then exactly one update on detach
        mock.expect_set_mtu()
            .with(eq(MASTER), eq(1494))
            .times(3)
            .returning(|_, _| Ok(()));

        let group = group(mock);
        group.attach(MASTER, PortType::Master).unwrap();
        let slave = group.attach(ETH0, PortType::SlaveA).unwrap();
        group.detach(slave).unwrap();

        assert!(!group.is_member(ETH0));
        assert_eq!(group.derived().features, Features::ALL);
    }

    #[test]
    fn test_master_in_use() {
        let mut mock = MockHostStack::new();
        permissive(&mut mock);
        mock.expect_set_mtu().returning(|_, _| Ok(()));

        let group = group(mock);
        let master = group.attach(MASTER, PortType::Master).unwrap();
        group.attach(ETH0, PortType::SlaveA).unwrap();
        assert_eq!(
            group.detach(master),
            Err(DetachError::MasterInUse { slaves: 1 })
        );
        assert!(group.is_member(MASTER));
    }

    #[test]
    fn test_detach_unknown_port() {
        let group = group(MockHostStack::new());
        let id = PortId::new(42);
        assert_eq!(group.detach(id), Err(DetachError::NotMember(id)));
    }

    #[test]
    fn test_duplicate_type_busy() {
        let mut mock = MockHostStack::new();
        permissive(&mut mock);
        mock.expect_set_mtu().returning(|_, _| Ok(()));

        let group = group(mock);
        group.attach(MASTER, PortType::Master).unwrap();
        group.attach(ETH0, PortType::SlaveA).unwrap();
        assert!(matches!(
            group.attach(ETH1, PortType::SlaveA),
            Err(AttachError::PortTypeBusy(PortType::SlaveA))
        ));
        assert!(matches!(
            group.attach(ETH0, PortType::SlaveB),
            Err(AttachError::AlreadyMember(_))
        ));
    }

    #[test]
    fn test_eligibility_checks() {
        let mut info = device(ETH0);
        assert!(check_device_eligible(&info).is_ok());

        info.addr_len = 8;
        assert!(matches!(
            check_device_eligible(&info),
            Err(AttachError::Ineligible {
                reason: Ineligibility::AddressLength(8),
                ..
            })
        ));

        let mut info = device(ETH0);
        info.link_type = LinkType::Other(32);
        assert!(matches!(
            check_device_eligible(&info),
            Err(AttachError::Ineligible {
                reason: Ineligibility::NotEthernet,
                ..
            })
        ));

        assert!(matches!(
            check_device_eligible(&device(MASTER)),
            Err(AttachError::NestedGroup(_))
        ));

        let mut info = device(ETH0);
        info.rx_hook = HookOwner::Redundancy;
        assert!(matches!(
            check_device_eligible(&info),
            Err(AttachError::AlreadyHooked(_))
        ));

        let mut info = device(ETH0);
        info.vlan = true;
        assert!(matches!(
            check_device_eligible(&info),
            Err(AttachError::VlanUnsupported(_))
        ));

        let mut info = device(ETH0);
        info.dont_bridge = true;
        assert!(matches!(
            check_device_eligible(&info),
            Err(AttachError::BridgingUnsupported(_))
        ));
    }
}
