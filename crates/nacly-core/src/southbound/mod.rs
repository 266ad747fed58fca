// ── Southbound enforcement ──
//
// Capability interface toward the data plane. Drivers never fail a
// decision: they report success as a bool and log every command outcome
// themselves.

mod host_firewall;
mod mock;

pub use host_firewall::{FirewallCommand, HostFirewallDriver};
pub use mock::MockDriver;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::{DriverKind, EngineConfig};
use crate::log_sink::LogSink;
use crate::model::{MacAddress, VlanId};

/// Block / allow-on-VLAN enforcement against some data plane.
#[async_trait]
pub trait SouthboundDriver: Send + Sync {
    /// Short identifier used in logs (`mock`, `host-firewall`, ...).
    fn name(&self) -> &'static str;

    /// Drop all traffic from `mac`. Returns whether enforcement took hold.
    async fn block_mac(&self, mac: &MacAddress) -> bool;

    /// Admit `mac` on `vlan`. Returns whether enforcement took hold.
    async fn allow_mac_on_vlan(&self, mac: &MacAddress, vlan: VlanId) -> bool;
}

/// Construct the driver selected by `config`.
pub fn build_driver(config: &EngineConfig, log: Arc<dyn LogSink>) -> Arc<dyn SouthboundDriver> {
    let kind = match config.driver {
        DriverKind::Auto => {
            if cfg!(unix) && find_executable(&config.firewall_binary).is_some() {
                DriverKind::HostFirewall
            } else {
                DriverKind::Mock
            }
        }
        other => other,
    };
    if config.driver == DriverKind::Auto {
        info!(driver = %kind, "auto-selected southbound driver");
    } else {
        debug!(driver = %kind, "using configured southbound driver");
    }

    match kind {
        DriverKind::HostFirewall => Arc::new(HostFirewallDriver::new(
            config.firewall_binary.clone(),
            config.command_timeout,
            log,
        )),
        DriverKind::Mock | DriverKind::Auto => Arc::new(MockDriver::new(log)),
    }
}

/// Locate `program` the way a shell would: paths with a separator are
/// taken as-is, bare names are searched on `PATH`.
pub fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
