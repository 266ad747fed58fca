//! Network access control decision and enforcement engine.
//!
//! Given a MAC address, the engine decides whether the device may join
//! the network and on which VLAN, pushes that decision to the data plane,
//! and records it:
//!
//! - **[`ControlPlane`]** — [`validate_and_program()`](ControlPlane::validate_and_program)
//!   normalizes the MAC, consults the device registry, resolves a VLAN,
//!   enforces the result, and writes the decision back. Cheap to clone and
//!   safe to share across tasks.
//!
//! - **[`PolicyResolver`]** — Pure precedence rules over the policy set:
//!   username match, then OUI prefix match, then the `default` policy.
//!
//! - **Southbound** ([`southbound`]) — The [`SouthboundDriver`] capability
//!   with a logging [`MockDriver`] and a [`HostFirewallDriver`] that shells
//!   out to the host packet filter under a timeout.
//!
//! - **Stores** ([`store`]) — [`DeviceRegistry`], [`PolicyStore`], and
//!   [`VlanProfileStore`] traits, implemented by the in-memory
//!   [`MemoryStore`] and the file-backed [`JsonStore`].
//!
//! - **Decision log** ([`log_sink`]) — Append-only [`LogSink`]s for the
//!   one-line-per-decision audit trail.
//!
//! - **ACL validation** ([`acl`]) — Normalizes textual ACL entries.

pub mod acl;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod log_sink;
pub mod model;
pub mod northbound;
pub mod resolver;
pub mod southbound;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use acl::{AclReport, AclRule, validate_acls};
pub use config::{DriverKind, EngineConfig};
pub use control_plane::{ControlPlane, Outcome};
pub use error::CoreError;
pub use log_sink::{FileLogSink, LogSink, MemoryLogSink, TracingLogSink};
pub use northbound::NorthboundApi;
pub use resolver::{PolicyResolver, Resolution, ResolutionSource};
pub use southbound::{HostFirewallDriver, MockDriver, SouthboundDriver, build_driver};
pub use store::{DeviceRegistry, ImportReport, JsonStore, MemoryStore, PolicyStore, VlanProfileStore};

pub use model::{
    AccessState, Decision, Device, MacAddress, Policy, PolicyCriteria, VlanId, VlanProfile,
    normalize_oui, to_colon_lower, to_hyphen_upper,
};
