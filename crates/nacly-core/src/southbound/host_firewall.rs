// ── Host firewall driver ──
//
// Programs the local packet filter by spawning the firewall binary
// directly (argv, no shell). Each command is bounded by a timeout and
// its outcome is logged on its own; an action succeeds when at least
// one of its commands does.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::SouthboundDriver;
use crate::error::CoreError;
use crate::log_sink::LogSink;
use crate::model::{MacAddress, VlanId};

/// Chains that receive a DROP rule when a MAC is blocked.
const BLOCK_CHAINS: [&str; 2] = ["INPUT", "FORWARD"];

/// One firewall invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl fmt::Display for FirewallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The fixed command sequence for blocking `mac`.
pub(crate) fn block_commands(program: &Path, mac: &MacAddress) -> Vec<FirewallCommand> {
    let mac = mac.colon_lower();
    BLOCK_CHAINS
        .iter()
        .map(|chain| FirewallCommand {
            program: program.to_path_buf(),
            args: ["-A", chain, "-m", "mac", "--mac-source", &mac, "-j", "DROP"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        })
        .collect()
}

pub struct HostFirewallDriver {
    binary: PathBuf,
    timeout: Duration,
    log: Arc<dyn LogSink>,
}

impl HostFirewallDriver {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration, log: Arc<dyn LogSink>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            log,
        }
    }

    /// Run one command to completion or until the timeout elapses.
    ///
    /// A timed-out child is killed when its handle drops.
    async fn exec(&self, cmd: &FirewallCommand) -> Result<(), CoreError> {
        debug!(cmd = %cmd, "exec");
        let fail = |reason: String| CoreError::EnforcementFailure {
            command: cmd.to_string(),
            reason,
        };

        let child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| fail(format!("timed out after {}s", self.timeout.as_secs_f64())))?
            .map_err(|e| fail(format!("spawn failed: {e}")))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let status = output
            .status
            .code()
            .map_or_else(|| "terminated by signal".to_owned(), |c| format!("exit {c}"));
        Err(fail(if stderr.is_empty() {
            status
        } else {
            format!("{status}: {stderr}")
        }))
    }

    /// Run every command, logging each outcome. True when any succeeded.
    async fn run_all(&self, commands: &[FirewallCommand]) -> bool {
        let mut any_ok = false;
        for cmd in commands {
            match self.exec(cmd).await {
                Ok(()) => {
                    any_ok = true;
                    debug!(cmd = %cmd, "firewall command applied");
                    self.log.append(&format!("southbound: applied cmd={cmd}"));
                }
                Err(err) => {
                    warn!(error = %err, "firewall command failed");
                    self.log.append(&format!("southbound: failed {err}"));
                }
            }
        }
        any_ok
    }
}

#[async_trait]
impl SouthboundDriver for HostFirewallDriver {
    fn name(&self) -> &'static str {
        "host-firewall"
    }

    async fn block_mac(&self, mac: &MacAddress) -> bool {
        let commands = block_commands(&self.binary, mac);
        self.run_all(&commands).await
    }

    async fn allow_mac_on_vlan(&self, mac: &MacAddress, vlan: VlanId) -> bool {
        // VLAN assignment happens upstream (switch / RADIUS); nothing to program here.
        let line = format!("southbound: allow mac={} vlan={vlan} (noop)", mac.colon_lower());
        debug!("{line}");
        self.log.append(&line);
        true
    }
}
