// ── Runtime engine configuration ──
//
// These types describe *how* the engine enforces decisions. They never
// touch disk: the CLI (or any embedder) builds an `EngineConfig` and
// hands it to `southbound::build_driver`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default bound on a single firewall command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Default firewall binary for the host-firewall driver.
pub const DEFAULT_FIREWALL_BINARY: &str = "iptables";

/// Which southbound driver to construct.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DriverKind {
    /// Host firewall when its binary is on `PATH` (Unix only), mock otherwise.
    #[default]
    Auto,
    /// Log intent only; every action reports success.
    Mock,
    /// Program the local host firewall.
    HostFirewall,
}

/// Enforcement settings for a control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub driver: DriverKind,
    /// Hard timeout applied to each external command.
    pub command_timeout: Duration,
    /// Program invoked by the host-firewall driver.
    pub firewall_binary: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Auto,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            firewall_binary: PathBuf::from(DEFAULT_FIREWALL_BINARY),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn driver_kind_parses_kebab_case() {
        assert_eq!(
            "host-firewall".parse::<DriverKind>().unwrap(),
            DriverKind::HostFirewall
        );
        assert_eq!("mock".parse::<DriverKind>().unwrap(), DriverKind::Mock);
        assert!("openflow".parse::<DriverKind>().is_err());
        assert_eq!(DriverKind::HostFirewall.to_string(), "host-firewall");
    }

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.driver, DriverKind::Auto);
        assert_eq!(cfg.command_timeout, Duration::from_secs(5));
        assert_eq!(cfg.firewall_binary, PathBuf::from("iptables"));
    }
}
