// ── Northbound intent API ──
//
// Translates access intents into southbound driver calls.

use std::sync::Arc;

use tracing::debug;

use crate::model::{MacAddress, VlanId};
use crate::southbound::SouthboundDriver;

#[derive(Clone)]
pub struct NorthboundApi {
    driver: Arc<dyn SouthboundDriver>,
}

impl NorthboundApi {
    pub fn new(driver: Arc<dyn SouthboundDriver>) -> Self {
        Self { driver }
    }

    /// Name of the driver intents are delegated to.
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Cut the device off the network.
    pub async fn quarantine(&self, mac: &MacAddress) -> bool {
        debug!(mac = %mac, driver = self.driver.name(), "intent: quarantine");
        self.driver.block_mac(mac).await
    }

    /// Admit the device on `vlan`.
    pub async fn permit_on_vlan(&self, mac: &MacAddress, vlan: VlanId) -> bool {
        debug!(mac = %mac, vlan = %vlan, driver = self.driver.name(), "intent: permit");
        self.driver.allow_mac_on_vlan(mac, vlan).await
    }
}

impl std::fmt::Debug for NorthboundApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NorthboundApi")
            .field("driver", &self.driver.name())
            .finish()
    }
}
