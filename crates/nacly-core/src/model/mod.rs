// ── Domain model ──
//
// Canonical types shared by the resolver, the control plane, and the
// bundled stores.

pub mod decision;
pub mod device;
pub mod mac;
pub mod policy;

pub use decision::Decision;
pub use device::{AccessState, Device, VlanId};
pub use mac::{MacAddress, normalize_oui, to_colon_lower, to_hyphen_upper};
pub use policy::{Policy, PolicyCriteria, VlanProfile};
