//! Integration test infrastructure for hsr-port
//!
//! Provides:
//! - [`SimHost`]: an in-memory host stack with fault injection
//! - [`RecordingForwarder`]: captures admitted frames
//! - Device and frame fixtures
//! - Test logging setup

pub mod fixtures;
mod forwarder;
mod sim_host;

pub use fixtures::*;
pub use forwarder::{ForwardedFrame, RecordingForwarder};
pub use sim_host::{DeviceState, HostCall, HostOp, SimHost};

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once; honours `RUST_LOG`.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second install from another test in the same binary is fine to lose.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
