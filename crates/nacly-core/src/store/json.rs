// ── JSON file store ──
//
// A directory holding `devices.json`, `policies.json`, and
// `vlan_profiles.json`. Every read goes to disk so edits made by other
// tools are picked up on the next call. Writes are read-modify-write
// under an exclusive advisory lock on `.nacly.lock`, shared by every
// handle and process on the directory, and land via a uniquely named
// temp file + rename.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use super::seed::ImportReport;
use super::{DeviceRegistry, PolicyStore, VlanProfileStore};
use crate::error::CoreError;
use crate::model::{Device, MacAddress, Policy, VlanId, VlanProfile};

const DEVICES_FILE: &str = "devices.json";
const POLICIES_FILE: &str = "policies.json";
const PROFILES_FILE: &str = "vlan_profiles.json";
const LOCK_FILE: &str = ".nacly.lock";

/// File-backed implementation of every store trait, plus the admin
/// mutations the CLI needs.
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
}

/// Held for the duration of a read-modify-write; the lock is released
/// when the file is closed.
struct WriteGuard {
    _file: File,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| CoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        debug!(dir = %dir.display(), "opened json store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// All devices, ordered by MAC.
    pub fn list_devices(&self) -> Result<Vec<Device>, CoreError> {
        Ok(self.load_devices()?.into_values().collect())
    }

    pub fn list_authorized_devices(&self) -> Result<Vec<Device>, CoreError> {
        Ok(self
            .list_devices()?
            .into_iter()
            .filter(|d| d.authorized)
            .collect())
    }

    /// Register (or overwrite) a device. Returns `true` if the MAC was new.
    pub fn register_device(&self, device: Device) -> Result<bool, CoreError> {
        let _guard = self.lock()?;
        let mut devices = self.load_devices()?;
        let is_new = devices.insert(device.key(), device).is_none();
        self.save_devices(&devices)?;
        Ok(is_new)
    }

    pub fn remove_device(&self, mac: &MacAddress) -> Result<bool, CoreError> {
        let _guard = self.lock()?;
        let mut devices = self.load_devices()?;
        let removed = devices.remove(&mac.hyphen_upper()).is_some();
        if removed {
            self.save_devices(&devices)?;
        }
        Ok(removed)
    }

    /// Insert devices whose MAC is not yet registered.
    pub fn import_devices(&self, incoming: Vec<Device>) -> Result<ImportReport, CoreError> {
        let _guard = self.lock()?;
        let mut devices = self.load_devices()?;
        let mut report = ImportReport::default();
        for device in incoming {
            let key = device.key();
            if devices.contains_key(&key) {
                report.skipped += 1;
            } else {
                devices.insert(key, device);
                report.inserted += 1;
            }
        }
        if report.inserted > 0 {
            self.save_devices(&devices)?;
        }
        Ok(report)
    }

    // ── Policies ─────────────────────────────────────────────────────

    /// Insert or replace a policy by name. Returns `true` if the name was new.
    pub fn upsert_policy(&self, policy: Policy) -> Result<bool, CoreError> {
        let _guard = self.lock()?;
        let mut policies = self.load_policies()?;
        let is_new = match policies.iter_mut().find(|p| p.name == policy.name) {
            Some(existing) => {
                *existing = policy;
                false
            }
            None => {
                policies.push(policy);
                true
            }
        };
        policies.sort_by(|a, b| a.name.cmp(&b.name));
        self.write_json(POLICIES_FILE, &policies)?;
        Ok(is_new)
    }

    pub fn delete_policy(&self, name: &str) -> Result<bool, CoreError> {
        let _guard = self.lock()?;
        let mut policies = self.load_policies()?;
        let before = policies.len();
        policies.retain(|p| p.name != name);
        let removed = policies.len() != before;
        if removed {
            self.write_json(POLICIES_FILE, &policies)?;
        }
        Ok(removed)
    }

    // ── VLAN profiles ────────────────────────────────────────────────

    pub fn list_profiles(&self) -> Result<Vec<VlanProfile>, CoreError> {
        Ok(self
            .load_profiles()?
            .into_iter()
            .map(|(username, vlan)| VlanProfile { username, vlan })
            .collect())
    }

    pub fn set_profile(&self, username: &str, vlan: VlanId) -> Result<(), CoreError> {
        if username.trim().is_empty() {
            return Err(CoreError::validation("username must not be empty"));
        }
        let _guard = self.lock()?;
        let mut profiles = self.load_profiles()?;
        profiles.insert(username.to_owned(), vlan);
        self.write_json(PROFILES_FILE, &profiles)
    }

    pub fn remove_profile(&self, username: &str) -> Result<bool, CoreError> {
        let _guard = self.lock()?;
        let mut profiles = self.load_profiles()?;
        let removed = profiles.remove(username).is_some();
        if removed {
            self.write_json(PROFILES_FILE, &profiles)?;
        }
        Ok(removed)
    }

    /// Insert profiles whose username is not yet mapped.
    pub fn import_profiles(&self, incoming: Vec<VlanProfile>) -> Result<ImportReport, CoreError> {
        let _guard = self.lock()?;
        let mut profiles = self.load_profiles()?;
        let mut report = ImportReport::default();
        for profile in incoming {
            if profiles.contains_key(&profile.username) {
                report.skipped += 1;
            } else {
                profiles.insert(profile.username, profile.vlan);
                report.inserted += 1;
            }
        }
        if report.inserted > 0 {
            self.write_json(PROFILES_FILE, &profiles)?;
        }
        Ok(report)
    }

    // ── File plumbing ────────────────────────────────────────────────

    fn lock(&self) -> Result<WriteGuard, CoreError> {
        let path = self.dir.join(LOCK_FILE);
        let io_err = |source: std::io::Error| CoreError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(io_err)?;
        FileExt::lock_exclusive(&file).map_err(io_err)?;
        Ok(WriteGuard { _file: file })
    }

    fn load_devices(&self) -> Result<BTreeMap<String, Device>, CoreError> {
        let devices: Vec<Device> = self.read_json(DEVICES_FILE)?.unwrap_or_default();
        Ok(devices.into_iter().map(|d| (d.key(), d)).collect())
    }

    fn save_devices(&self, devices: &BTreeMap<String, Device>) -> Result<(), CoreError> {
        let list: Vec<&Device> = devices.values().collect();
        self.write_json(DEVICES_FILE, &list)
    }

    fn load_policies(&self) -> Result<Vec<Policy>, CoreError> {
        Ok(self.read_json(POLICIES_FILE)?.unwrap_or_default())
    }

    fn load_profiles(&self) -> Result<BTreeMap<String, VlanId>, CoreError> {
        Ok(self.read_json(PROFILES_FILE)?.unwrap_or_default())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, CoreError> {
        let path = self.dir.join(file);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| CoreError::Serialization {
                path: path.display().to_string(),
                source,
            })
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), CoreError> {
        let path = self.dir.join(file);
        let body = serde_json::to_string_pretty(value).map_err(|source| {
            CoreError::Serialization {
                path: path.display().to_string(),
                source,
            }
        })?;
        let io_err = |source: std::io::Error| CoreError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(body.as_bytes()).map_err(io_err)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl DeviceRegistry for JsonStore {
    fn find_device(&self, mac: &MacAddress) -> Result<Option<Device>, CoreError> {
        Ok(self.load_devices()?.remove(&mac.hyphen_upper()))
    }

    fn upsert_device(&self, device: Device) -> Result<(), CoreError> {
        self.register_device(device).map(|_| ())
    }
}

impl PolicyStore for JsonStore {
    fn list_policies(&self) -> Result<Vec<Policy>, CoreError> {
        self.load_policies()
    }
}

impl VlanProfileStore for JsonStore {
    fn find_profile_vlan(&self, username: &str) -> Result<Option<VlanId>, CoreError> {
        Ok(self.load_profiles()?.get(username).copied())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mac(s: &str) -> MacAddress {
        MacAddress::parse(s).unwrap()
    }

    fn vlan(v: i64) -> VlanId {
        VlanId::new(v).unwrap()
    }

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_directory_reads_as_empty() {
        let (_dir, store) = store();
        assert!(store.list_devices().unwrap().is_empty());
        assert!(store.list_policies().unwrap().is_empty());
        assert_eq!(store.find_profile_vlan("alice").unwrap(), None);
    }

    #[test]
    fn upsert_device_replaces_on_conflict() {
        let (_dir, store) = store();
        let m = mac("aa:bb:cc:dd:ee:ff");

        store
            .upsert_device(Device::allowed(m, Some("alice".into()), vlan(20)))
            .unwrap();
        store
            .upsert_device(Device::blocked(m, Some("alice".into())))
            .unwrap();

        let devices = store.list_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert!(!devices[0].authorized);

        let raw = std::fs::read_to_string(store.dir().join(DEVICES_FILE)).unwrap();
        assert!(raw.contains("\"AA-BB-CC-DD-EE-FF\""));
    }

    #[test]
    fn authorized_listing_filters_blocked() {
        let (_dir, store) = store();
        store
            .register_device(Device::allowed(mac("00-00-00-00-00-02"), None, vlan(5)))
            .unwrap();
        store
            .register_device(Device::blocked(mac("00-00-00-00-00-01"), None))
            .unwrap();

        let authorized = store.list_authorized_devices().unwrap();
        assert_eq!(authorized.len(), 1);
        assert_eq!(authorized[0].key(), "00-00-00-00-00-02");
    }

    #[test]
    fn policy_crud() {
        let (_dir, store) = store();
        assert!(store.upsert_policy(Policy::username("eng", vlan(20), "alice")).unwrap());
        assert!(!store.upsert_policy(Policy::username("eng", vlan(21), "alice")).unwrap());
        assert!(store.upsert_policy(Policy::default_policy(vlan(5))).unwrap());

        let names: Vec<_> = store
            .list_policies()
            .unwrap()
            .into_iter()
            .map(|p| (p.name, p.vlan.get()))
            .collect();
        assert_eq!(names, vec![("default".into(), 5), ("eng".into(), 21)]);

        assert!(store.delete_policy("eng").unwrap());
        assert!(!store.delete_policy("eng").unwrap());
    }

    #[test]
    fn profiles_persist_as_object() {
        let (_dir, store) = store();
        store.set_profile("alice", vlan(20)).unwrap();
        store.set_profile("bob", vlan(30)).unwrap();
        assert!(store.remove_profile("bob").unwrap());

        let raw = std::fs::read_to_string(store.dir().join(PROFILES_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "alice": 20 }));
        assert!(store.set_profile("  ", vlan(3)).is_err());
    }

    #[test]
    fn import_is_insert_if_absent() {
        let (_dir, store) = store();
        store
            .register_device(Device::blocked(mac("AA-BB-CC-DD-EE-FF"), Some("kept".into())))
            .unwrap();

        let report = store
            .import_devices(vec![
                Device::allowed(mac("AA-BB-CC-DD-EE-FF"), Some("clobber".into()), vlan(9)),
                Device::allowed(mac("11-22-33-44-55-66"), None, vlan(9)),
            ])
            .unwrap();
        assert_eq!(report, ImportReport { inserted: 1, skipped: 1 });

        let kept = store.find_device(&mac("AA-BB-CC-DD-EE-FF")).unwrap().unwrap();
        assert_eq!(kept.username.as_deref(), Some("kept"));

        let report = store
            .import_profiles(vec![VlanProfile {
                username: "alice".into(),
                vlan: vlan(20),
            }])
            .unwrap();
        assert_eq!(report.inserted, 1);
    }

    #[test]
    fn separate_handles_do_not_lose_writes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");

        let threads: Vec<_> = (0..8u8)
            .map(|t| {
                let root = root.clone();
                std::thread::spawn(move || {
                    let store = JsonStore::open(root).unwrap();
                    for i in 0..10u8 {
                        let m = mac(&format!("22-22-22-00-{t:02X}-{i:02X}"));
                        store.upsert_device(Device::allowed(m, None, vlan(5))).unwrap();
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        let store = JsonStore::open(&root).unwrap();
        assert_eq!(store.list_devices().unwrap().len(), 80);
        let leftovers: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name != DEVICES_FILE && name != LOCK_FILE)
            .collect();
        assert!(leftovers.is_empty(), "stray files: {leftovers:?}");
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let (_dir, store) = store();
        std::fs::write(store.dir().join(POLICIES_FILE), "{ not json").unwrap();
        assert!(matches!(
            store.list_policies(),
            Err(CoreError::Serialization { .. })
        ));
    }
}
