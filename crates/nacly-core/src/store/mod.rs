// ── Collaborator stores ──
//
// The engine reads devices, policies, and VLAN profiles through these
// traits and writes only device records. Two implementations ship with
// the crate: an in-memory `MemoryStore` and a directory of JSON files
// (`JsonStore`).

mod json;
mod memory;
pub mod seed;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use seed::ImportReport;

use crate::error::CoreError;
use crate::model::{Device, MacAddress, Policy, VlanId};

/// Live cache of the last decision per MAC.
pub trait DeviceRegistry: Send + Sync {
    /// Look up a device by its hyphen-upper key.
    fn find_device(&self, mac: &MacAddress) -> Result<Option<Device>, CoreError>;

    /// Insert or replace the record keyed by `device.mac`. Must never fail
    /// on an existing key.
    fn upsert_device(&self, device: Device) -> Result<(), CoreError>;
}

/// Read-only view of the policy set.
pub trait PolicyStore: Send + Sync {
    fn list_policies(&self) -> Result<Vec<Policy>, CoreError>;
}

/// Read-only username → VLAN fallback table.
pub trait VlanProfileStore: Send + Sync {
    fn find_profile_vlan(&self, username: &str) -> Result<Option<VlanId>, CoreError>;
}
