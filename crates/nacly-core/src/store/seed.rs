//! Seed file parsing for bulk device and profile import.
//!
//! Device seeds come in two shapes: a JSON array of device objects, or a
//! plain allow-list with one MAC per line. Profile seeds are a JSON
//! object mapping usernames to VLAN ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreError;
use crate::model::{Device, MacAddress, VlanId, VlanProfile};

/// Outcome of an insert-if-absent bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct SeedDevice {
    #[serde(default)]
    mac: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_authorized")]
    authorized: bool,
    #[serde(default)]
    vlan: Option<i64>,
}

fn default_authorized() -> bool {
    true
}

/// Parsed device seed plus the number of entries that were unusable.
#[derive(Debug, Default)]
pub struct DeviceSeed {
    pub devices: Vec<Device>,
    pub rejected: usize,
}

/// Parse a device seed, auto-detecting JSON vs plain-text allow-list.
pub fn parse_device_seed(contents: &str) -> Result<DeviceSeed, CoreError> {
    if contents.trim_start().starts_with('[') {
        parse_device_json(contents)
    } else {
        Ok(parse_allow_list(contents))
    }
}

fn parse_device_json(contents: &str) -> Result<DeviceSeed, CoreError> {
    let entries: Vec<SeedDevice> =
        serde_json::from_str(contents).map_err(|source| CoreError::Serialization {
            path: "device seed".into(),
            source,
        })?;

    let mut seed = DeviceSeed::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let Some(raw_mac) = entry.mac else {
            warn!(index, "seed entry has no mac, skipping");
            seed.rejected += 1;
            continue;
        };
        let mac = match MacAddress::parse(&raw_mac) {
            Ok(mac) => mac,
            Err(e) => {
                warn!(index, error = %e, "seed entry has invalid mac, skipping");
                seed.rejected += 1;
                continue;
            }
        };
        let vlan = match entry.vlan.map(VlanId::new).transpose() {
            Ok(vlan) => vlan,
            Err(e) => {
                warn!(index, error = %e, "seed entry has invalid vlan, skipping");
                seed.rejected += 1;
                continue;
            }
        };
        let username = entry.username.or(entry.name);
        seed.devices
            .push(Device::new(mac, username, entry.authorized, vlan));
    }
    Ok(seed)
}

/// One MAC per line; usernames are `user<N>` by 1-based line number.
fn parse_allow_list(contents: &str) -> DeviceSeed {
    let mut seed = DeviceSeed::default();
    for (index, line) in contents.lines().enumerate() {
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        match MacAddress::parse(raw) {
            Ok(mac) => seed.devices.push(Device::new(
                mac,
                Some(format!("user{}", index + 1)),
                true,
                None,
            )),
            Err(_) => {
                warn!(line = index + 1, "allow-list entry is not a MAC, skipping");
                seed.rejected += 1;
            }
        }
    }
    seed
}

/// Parse `{"alice": 20, "bob": 30}` into profiles, sorted by username.
pub fn parse_profile_seed(contents: &str) -> Result<Vec<VlanProfile>, CoreError> {
    let map: BTreeMap<String, VlanId> =
        serde_json::from_str(contents).map_err(|source| CoreError::Serialization {
            path: "profile seed".into(),
            source,
        })?;
    Ok(map
        .into_iter()
        .map(|(username, vlan)| VlanProfile { username, vlan })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_seed_accepts_name_alias_and_defaults() {
        let seed = parse_device_seed(
            r#"[
                {"mac": "aa:bb:cc:dd:ee:ff", "name": "alice", "vlan": 20},
                {"mac": "11-22-33-44-55-66", "username": "bob", "authorized": false, "vlan": 30},
                {"username": "ghost"},
                {"mac": "bogus"}
            ]"#,
        )
        .unwrap();

        assert_eq!(seed.rejected, 2);
        assert_eq!(seed.devices.len(), 2);

        let alice = &seed.devices[0];
        assert_eq!(alice.key(), "AA-BB-CC-DD-EE-FF");
        assert_eq!(alice.username.as_deref(), Some("alice"));
        assert!(alice.authorized);
        assert_eq!(alice.vlan.map(VlanId::get), Some(20));

        let bob = &seed.devices[1];
        assert!(!bob.authorized);
        assert_eq!(bob.vlan, None);
    }

    #[test]
    fn allow_list_numbers_users_by_line() {
        let seed = parse_device_seed("AA-BB-CC-DD-EE-FF\n\nnot a mac\n11:22:33:44:55:66\n").unwrap();
        assert_eq!(seed.rejected, 1);
        let names: Vec<_> = seed
            .devices
            .iter()
            .map(|d| d.username.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["user1", "user4"]);
        assert!(seed.devices.iter().all(|d| d.authorized));
    }

    #[test]
    fn malformed_json_seed_is_an_error() {
        assert!(matches!(
            parse_device_seed("[{"),
            Err(CoreError::Serialization { .. })
        ));
    }

    #[test]
    fn profile_seed_sorted() {
        let profiles = parse_profile_seed(r#"{"bob": 30, "alice": 20}"#).unwrap();
        assert_eq!(profiles[0].username, "alice");
        assert_eq!(profiles[1].vlan.get(), 30);
        assert!(parse_profile_seed(r#"{"bob": 9999}"#).is_err());
    }
}
