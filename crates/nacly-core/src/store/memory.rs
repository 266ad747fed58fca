// ── In-memory store ──
//
// Concurrent storage with O(1) device lookups. Devices and profiles live
// in `DashMap`s (per-shard locks), policies in a single `RwLock<Vec<_>>`
// since they're always read as a whole snapshot.

use std::sync::{PoisonError, RwLock};

use dashmap::DashMap;

use super::{DeviceRegistry, PolicyStore, VlanProfileStore};
use crate::error::CoreError;
use crate::model::{Device, MacAddress, Policy, VlanId, VlanProfile};

/// Thread-safe in-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key: hyphen-upper MAC.
    devices: DashMap<String, Device>,
    policies: RwLock<Vec<Policy>>,
    profiles: DashMap<String, VlanId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding for tests and embedders.
    pub fn with_policies(self, policies: impl IntoIterator<Item = Policy>) -> Self {
        for policy in policies {
            self.put_policy(policy);
        }
        self
    }

    pub fn with_devices(self, devices: impl IntoIterator<Item = Device>) -> Self {
        for device in devices {
            self.devices.insert(device.key(), device);
        }
        self
    }

    pub fn with_profiles(self, profiles: impl IntoIterator<Item = VlanProfile>) -> Self {
        for profile in profiles {
            self.profiles.insert(profile.username, profile.vlan);
        }
        self
    }

    /// Insert or replace a policy by name. Returns `true` if the name was new.
    pub fn put_policy(&self, policy: Policy) -> bool {
        let mut policies = self.policies.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = policies.iter_mut().find(|p| p.name == policy.name) {
            *existing = policy;
            false
        } else {
            policies.push(policy);
            true
        }
    }

    pub fn remove_policy(&self, name: &str) -> bool {
        let mut policies = self.policies.write().unwrap_or_else(PoisonError::into_inner);
        let before = policies.len();
        policies.retain(|p| p.name != name);
        policies.len() != before
    }

    pub fn set_profile(&self, username: impl Into<String>, vlan: VlanId) {
        self.profiles.insert(username.into(), vlan);
    }

    pub fn remove_device(&self, mac: &MacAddress) -> Option<Device> {
        self.devices.remove(&mac.hyphen_upper()).map(|(_, d)| d)
    }

    /// All devices, ordered by MAC.
    pub fn devices_snapshot(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.devices.iter().map(|r| r.value().clone()).collect();
        devices.sort_by(|a, b| a.mac.cmp(&b.mac));
        devices
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl DeviceRegistry for MemoryStore {
    fn find_device(&self, mac: &MacAddress) -> Result<Option<Device>, CoreError> {
        Ok(self
            .devices
            .get(&mac.hyphen_upper())
            .map(|r| r.value().clone()))
    }

    fn upsert_device(&self, device: Device) -> Result<(), CoreError> {
        self.devices.insert(device.key(), device);
        Ok(())
    }
}

impl PolicyStore for MemoryStore {
    fn list_policies(&self) -> Result<Vec<Policy>, CoreError> {
        Ok(self
            .policies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

impl VlanProfileStore for MemoryStore {
    fn find_profile_vlan(&self, username: &str) -> Result<Option<VlanId>, CoreError> {
        Ok(self.profiles.get(username).map(|r| *r.value()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mac(s: &str) -> MacAddress {
        MacAddress::parse(s).unwrap()
    }

    fn vlan(v: i64) -> VlanId {
        VlanId::new(v).unwrap()
    }

    #[test]
    fn upsert_replaces_existing_record() {
        let store = MemoryStore::new();
        let m = mac("aa:bb:cc:dd:ee:ff");
        store
            .upsert_device(Device::allowed(m, None, vlan(10)))
            .unwrap();
        store.upsert_device(Device::blocked(m, None)).unwrap();

        assert_eq!(store.device_count(), 1);
        let found = store.find_device(&m).unwrap().unwrap();
        assert!(!found.authorized);
        assert_eq!(found.vlan, None);
    }

    #[test]
    fn lookup_is_case_and_separator_insensitive() {
        let store = MemoryStore::new()
            .with_devices([Device::allowed(mac("AA-BB-CC-DD-EE-FF"), None, vlan(10))]);
        assert!(
            store
                .find_device(&mac("aa:bb:cc:dd:ee:ff"))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn put_policy_replaces_by_name() {
        let store = MemoryStore::new();
        assert!(store.put_policy(Policy::default_policy(vlan(5))));
        assert!(!store.put_policy(Policy::default_policy(vlan(6))));

        let policies = store.list_policies().unwrap();
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].vlan, vlan(6));

        assert!(store.remove_policy("default"));
        assert!(!store.remove_policy("default"));
    }

    #[test]
    fn profiles_lookup() {
        let store = MemoryStore::new().with_profiles([VlanProfile {
            username: "bob".into(),
            vlan: vlan(40),
        }]);
        assert_eq!(store.find_profile_vlan("bob").unwrap(), Some(vlan(40)));
        assert_eq!(store.find_profile_vlan("carol").unwrap(), None);
    }

    #[test]
    fn snapshot_is_sorted_by_mac() {
        let store = MemoryStore::new().with_devices([
            Device::blocked(mac("FF-00-00-00-00-01"), None),
            Device::blocked(mac("00-00-00-00-00-01"), None),
        ]);
        let snap = store.devices_snapshot();
        assert_eq!(snap[0].key(), "00-00-00-00-00-01");
        assert_eq!(snap[1].key(), "FF-00-00-00-00-01");
    }
}
