//! The ingress hook installed on slave devices.

use std::sync::Weak;

use hsr_types::IfIndex;
use tracing::{trace, warn};

use crate::classify::{classify, ClassifyContext, ClassifyDecision};
use crate::frame::Frame;
use crate::group::GroupShared;
use crate::host::{HookOwner, RxHandler, RxHandlerResult};
use crate::port::Port;

/// Consumer of admitted frames: the deduplication/forwarding engine.
///
/// Called synchronously on the delivering thread, so frames from one port
/// arrive in order. Implementations must not retain `port` past the call;
/// a retained port stalls its detach.
pub trait Forwarder: Send + Sync {
    fn forward(&self, frame: &Frame<'_>, port: &Port);
}

/// Forwarder that drops everything.
#[derive(Debug, Default)]
pub struct DiscardForwarder;

impl Forwarder for DiscardForwarder {
    fn forward(&self, _frame: &Frame<'_>, _port: &Port) {}
}

/// Hook context bound to one device of one group.
///
/// Holds no port reference: the port is resolved from a registry snapshot
/// per frame, so a frame can only reach a port that is currently published.
pub(crate) struct PortHook {
    group: Weak<GroupShared>,
    ifindex: IfIndex,
}

impl PortHook {
    pub(crate) fn new(group: Weak<GroupShared>, ifindex: IfIndex) -> Self {
        Self { group, ifindex }
    }
}

impl RxHandler for PortHook {
    fn handle_frame(&self, frame: &Frame<'_>) -> RxHandlerResult {
        let Some(group) = self.group.upgrade() else {
            return RxHandlerResult::Pass;
        };
        let view = group.registry.snapshot();
        let Some(port) = view.port_by_ifindex(self.ifindex) else {
            return RxHandlerResult::Pass;
        };

        let ctx = ClassifyContext {
            self_addrs: view.self_addresses(),
            protocol: group.config.protocol,
            rx_offloaded: group.config.rx_offloaded,
        };
        let decision = classify(frame, port, &ctx);
        trace!(port = %port.name(), ?decision, "classified frame");

        match decision {
            ClassifyDecision::Unrelated => port.counters().record_passthrough(),
            ClassifyDecision::OwnOrigin => port.counters().record_own_rx(),
            ClassifyDecision::Malformed => {
                if port.counters().record_rx_error() == 0 {
                    warn!(
                        group = %group.config.name,
                        port = %port.name(),
                        "malformed frame at source port"
                    );
                }
            }
            ClassifyDecision::Admit => {
                port.counters().record_rx();
                group.forwarder.forward(frame, port);
            }
        }

        if decision.consumes() {
            RxHandlerResult::Consumed
        } else {
            RxHandlerResult::Pass
        }
    }

    fn owner(&self) -> HookOwner {
        HookOwner::Redundancy
    }
}
