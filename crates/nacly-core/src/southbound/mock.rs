// ── Mock driver ──
//
// Records what the host-firewall driver would have done and reports
// success. Used on hosts without a firewall binary and in tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::SouthboundDriver;
use super::host_firewall::block_commands;
use crate::config::DEFAULT_FIREWALL_BINARY;
use crate::log_sink::LogSink;
use crate::model::{MacAddress, VlanId};

pub struct MockDriver {
    log: Arc<dyn LogSink>,
}

impl MockDriver {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    fn record(&self, line: &str) {
        info!(target: "nacly::southbound", "{line}");
        self.log.append(line);
    }
}

#[async_trait]
impl SouthboundDriver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn block_mac(&self, mac: &MacAddress) -> bool {
        for cmd in block_commands(Path::new(DEFAULT_FIREWALL_BINARY), mac) {
            self.record(&format!("southbound-mock: would run cmd={cmd}"));
        }
        true
    }

    async fn allow_mac_on_vlan(&self, mac: &MacAddress, vlan: VlanId) -> bool {
        self.record(&format!(
            "southbound-mock: would allow mac={} vlan={vlan}",
            mac.colon_lower()
        ));
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;

    #[tokio::test]
    async fn block_logs_both_chains_and_succeeds() {
        let sink = Arc::new(MemoryLogSink::new());
        let driver = MockDriver::new(sink.clone());
        let mac = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();

        assert!(driver.block_mac(&mac).await);

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("-A INPUT -m mac --mac-source aa:bb:cc:dd:ee:ff -j DROP"));
        assert!(lines[1].contains("-A FORWARD"));
        assert!(lines.iter().all(|l| l.starts_with("southbound-mock:")));
    }

    #[tokio::test]
    async fn allow_logs_intent() {
        let sink = Arc::new(MemoryLogSink::new());
        let driver = MockDriver::new(sink.clone());
        let mac = MacAddress::parse("aa:bb:cc:dd:ee:ff").unwrap();

        assert!(
            driver
                .allow_mac_on_vlan(&mac, VlanId::new(20).unwrap())
                .await
        );
        assert_eq!(
            sink.lines(),
            vec!["southbound-mock: would allow mac=aa:bb:cc:dd:ee:ff vlan=20".to_owned()]
        );
    }
}
