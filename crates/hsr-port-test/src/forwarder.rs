//! Forwarder that records what the classifier admitted.

use std::thread;
use std::time::Duration;

use hsr_port::{Forwarder, Frame, Port};
use hsr_types::{IfIndex, MacAddress, PortType};
use parking_lot::Mutex;

/// What the forwarding engine would have seen for one admitted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedFrame {
    pub port_type: PortType,
    pub ifindex: IfIndex,
    pub source: Option<MacAddress>,
    pub ethertype: Option<u16>,
    pub len: usize,
}

#[derive(Debug, Default)]
pub struct RecordingForwarder {
    frames: Mutex<Vec<ForwardedFrame>>,
    delay: Option<Duration>,
}

impl RecordingForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps inside every forward call, widening races with detach.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            delay: Some(delay),
        }
    }

    pub fn frames(&self) -> Vec<ForwardedFrame> {
        self.frames.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn count_from(&self, port_type: PortType) -> usize {
        self.frames
            .lock()
            .iter()
            .filter(|f| f.port_type == port_type)
            .count()
    }
}

impl Forwarder for RecordingForwarder {
    fn forward(&self, frame: &Frame<'_>, port: &Port) {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        let header = frame.eth_header();
        self.frames.lock().push(ForwardedFrame {
            port_type: port.port_type(),
            ifindex: port.ifindex(),
            source: header.map(|h| h.source),
            ethertype: header.map(|h| h.ethertype),
            len: frame.bytes().len(),
        });
    }
}
