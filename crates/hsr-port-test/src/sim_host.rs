//! In-memory host network stack.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use hsr_port::{
    DeviceInfo, Features, Frame, HookOwner, HostError, HostStack, RxHandler, RxHandlerResult,
};
use hsr_types::IfIndex;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Host operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    DeviceInfo,
    ClaimMaster,
    Hold,
    SetPromiscuity,
    RegisterRxHandler,
    UnregisterRxHandler,
    SetMtu,
}

/// One recorded call into the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    ClaimMaster(IfIndex),
    ReleaseMaster(IfIndex),
    Hold(IfIndex),
    Put(IfIndex),
    SetPromiscuity(IfIndex, i32),
    DisableLro(IfIndex),
    RegisterRxHandler(IfIndex),
    UnregisterRxHandler(IfIndex),
    SetMtu(IfIndex, u32),
    SetFeatures(IfIndex, Features),
}

/// Observable state of a simulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub info: DeviceInfo,
    pub refcount: u32,
    pub promiscuity: i32,
    pub lro_disabled: bool,
    pub hooked: bool,
    /// Held as the master of some group.
    pub claimed: bool,
}

struct SimDevice {
    info: DeviceInfo,
    refcount: u32,
    promiscuity: i32,
    lro_disabled: bool,
    claimed: bool,
    handler: Option<Arc<dyn RxHandler>>,
}

impl SimDevice {
    fn state(&self) -> DeviceState {
        DeviceState {
            info: self.info.clone(),
            refcount: self.refcount,
            promiscuity: self.promiscuity,
            lro_disabled: self.lro_disabled,
            hooked: self.handler.is_some(),
            claimed: self.claimed,
        }
    }
}

/// Host stack backed by a device table.
///
/// Every mutating call is appended to a call log. Faults armed with
/// [`SimHost::fail_next`] fire once on the next call of that operation.
#[derive(Default)]
pub struct SimHost {
    devices: Mutex<BTreeMap<IfIndex, SimDevice>>,
    faults: Mutex<HashSet<HostOp>>,
    calls: Mutex<Vec<HostCall>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&self, info: DeviceInfo) {
        let device = SimDevice {
            info,
            refcount: 0,
            promiscuity: 0,
            lro_disabled: false,
            claimed: false,
            handler: None,
        };
        self.devices.lock().insert(device.info.ifindex, device);
    }

    pub fn remove_device(&self, ifindex: IfIndex) -> Option<DeviceState> {
        self.devices.lock().remove(&ifindex).map(|d| d.state())
    }

    pub fn device(&self, ifindex: IfIndex) -> Option<DeviceState> {
        self.devices.lock().get(&ifindex).map(SimDevice::state)
    }

    /// Changes a device's MTU behind the group's back.
    pub fn set_device_mtu(&self, ifindex: IfIndex, mtu: u32) {
        if let Some(device) = self.devices.lock().get_mut(&ifindex) {
            device.info.mtu = mtu;
        }
    }

    pub fn fail_next(&self, op: HostOp) {
        self.faults.lock().insert(op);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Runs a frame through the device's ingress hook, if one is installed.
    ///
    /// The hook is called outside the device table lock, the way a driver's
    /// receive path runs concurrently with configuration changes.
    pub fn deliver(&self, ifindex: IfIndex, frame: &Frame<'_>) -> RxHandlerResult {
        let handler = self
            .devices
            .lock()
            .get(&ifindex)
            .and_then(|d| d.handler.clone());
        match handler {
            Some(handler) => handler.handle_frame(frame),
            None => RxHandlerResult::Pass,
        }
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }

    fn check_fault(&self, op: HostOp, ifname: &str) -> Result<(), HostError> {
        if self.faults.lock().remove(&op) {
            debug!(?op, ifname, "injecting host fault");
            return Err(HostError::failed(
                format!("{op:?}"),
                ifname,
                "injected fault",
            ));
        }
        Ok(())
    }

    fn with_device<T>(
        &self,
        ifindex: IfIndex,
        f: impl FnOnce(&mut SimDevice) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        let mut devices = self.devices.lock();
        let device = devices
            .get_mut(&ifindex)
            .ok_or(HostError::NoSuchDevice(ifindex))?;
        f(device)
    }
}

impl HostStack for SimHost {
    fn device_info(&self, ifindex: IfIndex) -> Result<DeviceInfo, HostError> {
        self.check_fault(HostOp::DeviceInfo, &ifindex.to_string())?;
        self.with_device(ifindex, |d| Ok(d.info.clone()))
    }

    fn hold(&self, ifindex: IfIndex) -> Result<(), HostError> {
        self.with_device(ifindex, |d| {
            self.check_fault(HostOp::Hold, &d.info.name)?;
            d.refcount += 1;
            Ok(())
        })?;
        self.record(HostCall::Hold(ifindex));
        Ok(())
    }

    fn put(&self, ifindex: IfIndex) {
        let result = self.with_device(ifindex, |d| {
            if d.refcount == 0 {
                warn!(ifname = %d.info.name, "reference released twice");
            }
            d.refcount = d.refcount.saturating_sub(1);
            Ok(())
        });
        if result.is_err() {
            warn!(%ifindex, "release on unknown device");
        }
        self.record(HostCall::Put(ifindex));
    }

    fn claim_master(&self, ifindex: IfIndex) -> Result<(), HostError> {
        self.with_device(ifindex, |d| {
            self.check_fault(HostOp::ClaimMaster, &d.info.name)?;
            if d.claimed {
                return Err(HostError::Busy(d.info.name.clone()));
            }
            d.claimed = true;
            Ok(())
        })?;
        self.record(HostCall::ClaimMaster(ifindex));
        Ok(())
    }

    fn release_master(&self, ifindex: IfIndex) {
        let result = self.with_device(ifindex, |d| {
            if !d.claimed {
                warn!(ifname = %d.info.name, "master released twice");
            }
            d.claimed = false;
            Ok(())
        });
        if result.is_err() {
            warn!(%ifindex, "release on unknown device");
        }
        self.record(HostCall::ReleaseMaster(ifindex));
    }

    fn set_promiscuity(&self, ifindex: IfIndex, delta: i32) -> Result<(), HostError> {
        self.with_device(ifindex, |d| {
            self.check_fault(HostOp::SetPromiscuity, &d.info.name)?;
            d.promiscuity += delta;
            Ok(())
        })?;
        self.record(HostCall::SetPromiscuity(ifindex, delta));
        Ok(())
    }

    fn disable_lro(&self, ifindex: IfIndex) {
        let _ = self.with_device(ifindex, |d| {
            d.lro_disabled = true;
            d.info.features = d.info.features & !Features::LRO;
            Ok(())
        });
        self.record(HostCall::DisableLro(ifindex));
    }

    fn register_rx_handler(
        &self,
        ifindex: IfIndex,
        handler: Arc<dyn RxHandler>,
    ) -> Result<(), HostError> {
        self.with_device(ifindex, |d| {
            self.check_fault(HostOp::RegisterRxHandler, &d.info.name)?;
            if d.handler.is_some() {
                return Err(HostError::Busy(d.info.name.clone()));
            }
            d.info.rx_hook = handler.owner();
            d.handler = Some(handler);
            Ok(())
        })?;
        self.record(HostCall::RegisterRxHandler(ifindex));
        Ok(())
    }

    fn unregister_rx_handler(&self, ifindex: IfIndex) -> Result<(), HostError> {
        self.with_device(ifindex, |d| {
            self.check_fault(HostOp::UnregisterRxHandler, &d.info.name)?;
            if d.handler.take().is_none() {
                return Err(HostError::failed(
                    "unregister_rx_handler",
                    &d.info.name,
                    "no handler installed",
                ));
            }
            d.info.rx_hook = HookOwner::None;
            Ok(())
        })?;
        self.record(HostCall::UnregisterRxHandler(ifindex));
        Ok(())
    }

    fn set_mtu(&self, ifindex: IfIndex, mtu: u32) -> Result<(), HostError> {
        self.with_device(ifindex, |d| {
            self.check_fault(HostOp::SetMtu, &d.info.name)?;
            d.info.mtu = mtu;
            Ok(())
        })?;
        self.record(HostCall::SetMtu(ifindex, mtu));
        Ok(())
    }

    fn set_features(&self, ifindex: IfIndex, features: Features) {
        let _ = self.with_device(ifindex, |d| {
            d.info.features = features;
            Ok(())
        });
        self.record(HostCall::SetFeatures(ifindex, features));
    }
}
