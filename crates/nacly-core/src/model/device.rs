// ── Device domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;

use super::mac::MacAddress;
use crate::error::CoreError;

const VLAN_MIN: i64 = 1;
const VLAN_MAX: i64 = 4094;

/// 802.1Q VLAN identifier, always within 1..=4094.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    pub fn new(value: i64) -> Result<Self, CoreError> {
        if (VLAN_MIN..=VLAN_MAX).contains(&value) {
            u16::try_from(value)
                .map(Self)
                .map_err(|_| CoreError::InvalidVlan { value })
        } else {
            Err(CoreError::InvalidVlan { value })
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for VlanId {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> Self {
        vlan.0
    }
}

/// Where a known MAC currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Blocked,
    Allowed(VlanId),
}

/// A registered device: the persisted projection of the latest decision
/// for its MAC.
///
/// `vlan` is only ever populated while `authorized` is true; use
/// [`Device::new`] to get that coercion for free. Deserialization goes
/// through the same constructor, so a stored `vlan` on a blocked record
/// is dropped on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeviceRecord")]
pub struct Device {
    pub mac: MacAddress,
    pub username: Option<String>,
    pub authorized: bool,
    pub vlan: Option<VlanId>,
}

/// On-disk shape of a device record.
#[derive(Deserialize)]
struct DeviceRecord {
    mac: MacAddress,
    #[serde(default)]
    username: Option<String>,
    authorized: bool,
    #[serde(default)]
    vlan: Option<VlanId>,
}

impl From<DeviceRecord> for Device {
    fn from(record: DeviceRecord) -> Self {
        Self::new(record.mac, record.username, record.authorized, record.vlan)
    }
}

impl Device {
    pub fn new(
        mac: MacAddress,
        username: Option<String>,
        authorized: bool,
        vlan: Option<VlanId>,
    ) -> Self {
        Self {
            mac,
            username: username.filter(|u| !u.is_empty()),
            authorized,
            vlan: if authorized { vlan } else { None },
        }
    }

    pub fn allowed(mac: MacAddress, username: Option<String>, vlan: VlanId) -> Self {
        Self::new(mac, username, true, Some(vlan))
    }

    pub fn blocked(mac: MacAddress, username: Option<String>) -> Self {
        Self::new(mac, username, false, None)
    }

    /// Registry key (hyphen-upper MAC).
    pub fn key(&self) -> String {
        self.mac.hyphen_upper()
    }

    pub fn state(&self) -> AccessState {
        match (self.authorized, self.vlan) {
            (true, Some(vlan)) => AccessState::Allowed(vlan),
            _ => AccessState::Blocked,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mac() -> MacAddress {
        MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap()
    }

    #[test]
    fn vlan_bounds() {
        assert!(VlanId::new(0).is_err());
        assert!(VlanId::new(1).is_ok());
        assert!(VlanId::new(4094).is_ok());
        assert!(VlanId::new(4095).is_err());
        assert!(VlanId::new(-3).is_err());
    }

    #[test]
    fn vlan_deserialize_rejects_out_of_range() {
        assert_eq!(serde_json::from_str::<VlanId>("20").unwrap().get(), 20);
        assert!(serde_json::from_str::<VlanId>("5000").is_err());
    }

    #[test]
    fn unauthorized_device_drops_vlan() {
        let vlan = VlanId::new(10).unwrap();
        let device = Device::new(mac(), Some("bob".into()), false, Some(vlan));
        assert_eq!(device.vlan, None);
        assert_eq!(device.state(), AccessState::Blocked);
    }

    #[test]
    fn empty_username_is_none() {
        let device = Device::blocked(mac(), Some(String::new()));
        assert_eq!(device.username, None);
    }

    #[test]
    fn allowed_device_state() {
        let vlan = VlanId::new(30).unwrap();
        let device = Device::allowed(mac(), None, vlan);
        assert_eq!(device.state(), AccessState::Allowed(vlan));
        assert_eq!(device.key(), "AA-BB-CC-DD-EE-FF");
    }

    #[test]
    fn device_json_shape() {
        let device: Device = serde_json::from_str(
            r#"{"mac": "aa:bb:cc:dd:ee:ff", "username": "alice", "authorized": true, "vlan": 20}"#,
        )
        .unwrap();
        assert_eq!(device.mac, mac());
        assert_eq!(device.vlan, Some(VlanId::new(20).unwrap()));

        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["mac"], "AA-BB-CC-DD-EE-FF");
    }

    #[test]
    fn blocked_record_loses_its_vlan_on_load() {
        let device: Device = serde_json::from_str(
            r#"{"mac": "AA-BB-CC-DD-EE-FF", "username": "", "authorized": false, "vlan": 20}"#,
        )
        .unwrap();
        assert!(!device.authorized);
        assert_eq!(device.vlan, None);
        assert_eq!(device.username, None);
        assert_eq!(device.state(), AccessState::Blocked);
    }

    #[test]
    fn missing_optional_fields_default_to_none() {
        let device: Device =
            serde_json::from_str(r#"{"mac": "AA-BB-CC-DD-EE-FF", "authorized": true}"#).unwrap();
        assert_eq!(device.username, None);
        assert_eq!(device.vlan, None);
    }
}
