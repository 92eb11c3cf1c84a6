//! Port lifecycle and ingress classification for HSR/PRP redundancy groups.
//!
//! A redundancy group owns one master interface and up to three attached
//! physical interfaces (slave A, slave B, interlink). This crate manages
//! those memberships and screens every frame arriving on a slave before it
//! reaches the forwarding engine:
//!
//! - [`RedundancyGroup`]: attach/detach protocol and derived master state
//! - [`GroupSnapshot`]: owned membership copies for callers outside the data path
//! - [`PortRegistry`]: copy-on-write membership views for the data path
//! - [`classify()`]: the per-frame ingress decision
//! - [`HostStack`]: the host network stack seam (devices, hooks, MTU)
//! - [`GroupConfig`]: TOML group configuration
//!
//! # Concurrency
//!
//! Attach and detach run on a control thread and are serialized per group.
//! The ingress path runs on any number of delivery threads and never takes
//! a lock: it loads the current [`PortView`] and resolves its port from it.
//! Detach unpublishes the port first, then waits for every reader of the
//! old view before releasing the device.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hsr_port::{DiscardForwarder, GroupConfig, RedundancyGroup};
//! use hsr_types::{IfIndex, PortType, ProtocolVersion};
//!
//! let config = GroupConfig::new("hsr0", ProtocolVersion::HsrV1);
//! let group = RedundancyGroup::new(config, host, Arc::new(DiscardForwarder))?;
//! group.attach(IfIndex::new(10), PortType::Master)?;
//! let a = group.attach(IfIndex::new(2), PortType::SlaveA)?;
//! group.attach(IfIndex::new(3), PortType::SlaveB)?;
//! group.detach(a)?;
//! group.teardown();
//! ```
//!
//! # Ingress decisions
//!
//! | Frame | Decision | Hook result |
//! |-------|----------|-------------|
//! | arrived on the master | [`ClassifyDecision::Unrelated`] | pass |
//! | looped back by the host | [`ClassifyDecision::Unrelated`] | pass |
//! | source is a group address | [`ClassifyDecision::OwnOrigin`] | consumed, dropped |
//! | not redundancy traffic | [`ClassifyDecision::Unrelated`] | pass |
//! | header misplaced | [`ClassifyDecision::Malformed`] | consumed, dropped |
//! | otherwise | [`ClassifyDecision::Admit`] | consumed, forwarded |

pub mod classify;
pub mod config;
pub mod error;
pub mod frame;
pub mod group;
pub mod hook;
pub mod host;
pub mod port;
pub mod registry;
mod rollback;

pub use classify::{classify, ClassifyContext, ClassifyDecision};
pub use config::GroupConfig;
pub use error::{
    AttachError, AttachResult, ConfigError, DetachError, HostError, Ineligibility, RegistryError,
};
pub use frame::{EthHeader, Frame};
pub use group::{check_device_eligible, check_master_eligible, DerivedState, RedundancyGroup};
pub use hook::{DiscardForwarder, Forwarder};
pub use host::{DeviceInfo, Features, HookOwner, HostStack, RxHandler, RxHandlerResult};
pub use port::{Port, PortCounters, PortId, PortStats};
pub use registry::{GroupSnapshot, PortInfo, PortRegistry, PortView};
