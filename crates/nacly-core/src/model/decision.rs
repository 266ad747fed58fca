// ── Decision: the engine's only output ──

use serde::{Deserialize, Serialize};

use super::device::{AccessState, Device, VlanId};
use super::mac::MacAddress;

/// Outcome of a single `validate_and_program` call.
///
/// Never persisted as-is; the registry's [`Device`] record is its
/// projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub mac: MacAddress,
    pub username: Option<String>,
    pub authorized: bool,
    pub vlan: Option<VlanId>,
}

impl Decision {
    pub fn allow(mac: MacAddress, username: Option<String>, vlan: VlanId) -> Self {
        Self {
            mac,
            username,
            authorized: true,
            vlan: Some(vlan),
        }
    }

    pub fn block(mac: MacAddress, username: Option<String>) -> Self {
        Self {
            mac,
            username,
            authorized: false,
            vlan: None,
        }
    }

    pub fn state(&self) -> AccessState {
        match self.vlan {
            Some(vlan) if self.authorized => AccessState::Allowed(vlan),
            _ => AccessState::Blocked,
        }
    }

    /// The registry record this decision projects to.
    pub fn to_device(&self) -> Device {
        Device::new(self.mac, self.username.clone(), self.authorized, self.vlan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blocked_decision_serializes_nulls() {
        let mac = MacAddress::parse("11-22-33-44-55-66").unwrap();
        let value = serde_json::to_value(Decision::block(mac, None)).unwrap();
        assert_eq!(
            value,
            json!({
                "mac": "11-22-33-44-55-66",
                "username": null,
                "authorized": false,
                "vlan": null,
            })
        );
    }

    #[test]
    fn allowed_decision_projects_to_device() {
        let mac = MacAddress::parse("aa:bb:cc:dd:ee:ff").unwrap();
        let vlan = VlanId::new(20).unwrap();
        let decision = Decision::allow(mac, Some("alice".into()), vlan);

        assert_eq!(decision.state(), AccessState::Allowed(vlan));
        let device = decision.to_device();
        assert!(device.authorized);
        assert_eq!(device.vlan, Some(vlan));
        assert_eq!(device.username.as_deref(), Some("alice"));
    }
}
