//! Error types for port management operations.
//!
//! Attach errors are split into rejections (nothing was touched) and partial
//! failures (something was touched and has been rolled back). Classification
//! anomalies are never errors; they only show up in port counters.

use hsr_types::{IfIndex, PortType};
use thiserror::Error;

use crate::port::PortId;

/// Result type alias for attach operations.
pub type AttachResult<T> = Result<T, AttachError>;

/// Reason a device cannot be used as a redundancy slave at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// The device is a loopback device.
    Loopback,
    /// The device is not an Ethernet-class device.
    NotEthernet,
    /// The device address is not a full 6-byte MAC address.
    AddressLength(u8),
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ineligibility::Loopback => write!(f, "loopback device"),
            Ineligibility::NotEthernet => write!(f, "not an Ethernet device"),
            Ineligibility::AddressLength(len) => write!(f, "address length {}", len),
        }
    }
}

/// Errors returned by the host network stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("No such device: ifindex {0}")]
    NoSuchDevice(IfIndex),

    #[error("Device '{0}' is busy")]
    Busy(String),

    #[error("{op} failed on '{ifname}': {message}")]
    OperationFailed {
        /// The host operation (e.g., "set_promiscuity").
        op: String,
        /// The device name.
        ifname: String,
        /// Error message.
        message: String,
    },
}

impl HostError {
    /// Creates an operation failure.
    pub fn failed(
        op: impl Into<String>,
        ifname: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::OperationFailed {
            op: op.into(),
            ifname: ifname.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while attaching a device to a group.
#[derive(Debug, Error)]
pub enum AttachError {
    /// Device kind cannot carry redundancy traffic.
    #[error("Cannot use '{ifname}' as redundancy slave: {reason}")]
    Ineligible { ifname: String, reason: Ineligibility },

    /// Device is itself the master of a redundancy group.
    #[error("Cannot create trees of redundancy devices: '{0}' is a redundancy master")]
    NestedGroup(String),

    /// Device already carries this protocol's ingress hook.
    #[error("Device '{0}' is already a redundancy slave")]
    AlreadyHooked(String),

    #[error("Redundancy on top of VLAN device '{0}' is not supported")]
    VlanUnsupported(String),

    #[error("Device '{0}' does not support bridging")]
    BridgingUnsupported(String),

    /// The group already has a port of this type.
    #[error("Group already has a {0} port")]
    PortTypeBusy(PortType),

    /// The device is already a member of this group.
    #[error("Device '{0}' is already a member of this group")]
    AlreadyMember(String),

    /// Slaves can only join a group whose master is attached.
    #[error("Group has no master port")]
    NoMaster,

    /// Only a redundancy master device can hold the master role.
    #[error("Device '{0}' is not a redundancy master device")]
    NotRedundancyMaster(String),

    /// The master device already fronts another group.
    #[error("Master device '{ifname}' belongs to another group: {source}")]
    MasterClaimed {
        ifname: String,
        #[source]
        source: HostError,
    },

    #[error("Device lookup failed: {source}")]
    DeviceLookup {
        #[source]
        source: HostError,
    },

    #[error("Could not hold device '{ifname}': {source}")]
    ReferenceFailed {
        ifname: String,
        #[source]
        source: HostError,
    },

    #[error("Could not enable promiscuous mode on '{ifname}': {source}")]
    PromiscuityFailed {
        ifname: String,
        #[source]
        source: HostError,
    },

    #[error("Could not install ingress hook on '{ifname}': {source}")]
    HookInstallFailed {
        ifname: String,
        #[source]
        source: HostError,
    },
}

impl AttachError {
    /// Returns true if the attach was refused before any device state changed.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AttachError::ReferenceFailed { .. }
                | AttachError::PromiscuityFailed { .. }
                | AttachError::HookInstallFailed { .. }
        )
    }
}

/// Errors that prevent a detach from starting.
///
/// Once a detach starts it always completes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetachError {
    #[error("Port {0} is not a member of this group")]
    NotMember(PortId),

    /// The master cannot leave while slaves remain.
    #[error("Master port cannot be removed while {slaves} slave port(s) remain")]
    MasterInUse { slaves: usize },
}

/// Errors from registry membership updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Interface {0} is already registered")]
    AlreadyMember(IfIndex),

    #[error("A {0} port is already registered")]
    TypeBusy(PortType),

    #[error("Port {0} not found")]
    NotFound(PortId),
}

/// Errors from loading or validating group configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    /// Creates a validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}
