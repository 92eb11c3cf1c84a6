//! Contract with the host network stack.
//!
//! The port manager never owns network devices. Everything it does to a
//! device (eligibility queries, reference counting, promiscuity, the ingress
//! hook, MTU and feature propagation) goes through [`HostStack`].

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use hsr_types::{IfIndex, LinkType, MacAddress};
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::frame::Frame;

#[cfg(test)]
use mockall::automock;

/// Offload feature bits of a network device.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(u64);

impl Features {
    pub const NONE: Features = Features(0);
    pub const SG: Features = Features(1 << 0);
    pub const HW_CSUM: Features = Features(1 << 1);
    pub const HIGHDMA: Features = Features(1 << 2);
    pub const GSO: Features = Features(1 << 3);
    pub const TSO: Features = Features(1 << 4);
    pub const LRO: Features = Features(1 << 5);
    pub const GRO: Features = Features(1 << 6);
    pub const HW_VLAN_CTAG_TX: Features = Features(1 << 7);
    pub const HW_HSR_TAG_INS: Features = Features(1 << 8);
    pub const HW_HSR_TAG_RM: Features = Features(1 << 9);
    pub const HW_HSR_FWD: Features = Features(1 << 10);
    pub const HW_HSR_DUP: Features = Features(1 << 11);
    pub const ALL: Features = Features(u64::MAX);

    pub const fn from_bits(bits: u64) -> Self {
        Features(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub const fn contains(&self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitAnd for Features {
    type Output = Features;

    fn bitand(self, rhs: Features) -> Features {
        Features(self.0 & rhs.0)
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

impl Not for Features {
    type Output = Features;

    fn not(self) -> Features {
        Features(!self.0)
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Features({:#x})", self.0)
    }
}

/// Who owns the ingress hook currently installed on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookOwner {
    #[default]
    None,
    /// A redundancy-group port hook.
    Redundancy,
    /// Some other subsystem (bridge, bond, macvlan, ...).
    Other,
}

/// Snapshot of the device attributes relevant to attaching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub ifindex: IfIndex,
    pub name: String,
    pub link_type: LinkType,
    /// Length of the device's hardware address.
    pub addr_len: u8,
    pub mac: MacAddress,
    pub mtu: u32,
    pub features: Features,
    pub loopback: bool,
    pub vlan: bool,
    /// Device refuses to be bridged (IFF_DONT_BRIDGE).
    pub dont_bridge: bool,
    /// Device is the logical master of some redundancy group.
    pub redundancy_master: bool,
    pub rx_hook: HookOwner,
}

/// Outcome of an ingress hook invocation, as seen by the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxHandlerResult {
    /// The hook took the frame; the host must not deliver it further.
    Consumed,
    /// Normal stack processing continues.
    Pass,
}

/// Callback a host stack invokes for every frame received on a hooked device.
pub trait RxHandler: Send + Sync {
    fn handle_frame(&self, frame: &Frame<'_>) -> RxHandlerResult;

    /// Identifies the hook's owner so eligibility checks can spot our own hooks.
    fn owner(&self) -> HookOwner {
        HookOwner::Other
    }
}

/// Operations the port manager borrows from the host network stack.
///
/// Implementations must be callable from any thread. `register_rx_handler`
/// fails if the device already carries a hook.
#[cfg_attr(test, automock)]
pub trait HostStack: Send + Sync {
    /// Returns the current attributes of a device.
    fn device_info(&self, ifindex: IfIndex) -> Result<DeviceInfo, HostError>;

    /// Takes a reference on a device, preventing its removal.
    fn hold(&self, ifindex: IfIndex) -> Result<(), HostError>;

    /// Releases a reference taken with [`HostStack::hold`].
    fn put(&self, ifindex: IfIndex);

    /// Marks a redundancy master device as owned by one group.
    ///
    /// Fails with [`HostError::Busy`] while another claim is held.
    fn claim_master(&self, ifindex: IfIndex) -> Result<(), HostError>;

    /// Drops a claim taken with [`HostStack::claim_master`].
    fn release_master(&self, ifindex: IfIndex);

    /// Adjusts the device's promiscuity count by `inc`.
    fn set_promiscuity(&self, ifindex: IfIndex, inc: i32) -> Result<(), HostError>;

    /// Disables large receive offload coalescing.
    fn disable_lro(&self, ifindex: IfIndex);

    /// Installs the ingress hook on a device.
    fn register_rx_handler(
        &self,
        ifindex: IfIndex,
        handler: Arc<dyn RxHandler>,
    ) -> Result<(), HostError>;

    /// Removes the ingress hook from a device.
    fn unregister_rx_handler(&self, ifindex: IfIndex) -> Result<(), HostError>;

    fn set_mtu(&self, ifindex: IfIndex, mtu: u32) -> Result<(), HostError>;

    /// Applies a recomputed feature set to a device.
    fn set_features(&self, ifindex: IfIndex, features: Features);
}
