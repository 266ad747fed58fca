// ── Control plane ──
//
// Turns a raw MAC into an access decision, enforces it through the
// northbound intent API, and writes the decision back to the device
// registry. Every call runs to completion on the caller's task; there
// are no background workers.

use std::fmt;
use std::sync::Arc;

use strum::Display;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::log_sink::LogSink;
use crate::model::{Decision, Device, MacAddress};
use crate::northbound::NorthboundApi;
use crate::resolver::{PolicyResolver, Resolution, ResolutionSource};
use crate::southbound::SouthboundDriver;
use crate::store::{DeviceRegistry, PolicyStore, VlanProfileStore};

// ── Outcome ──────────────────────────────────────────────────────

/// Which branch of the decision procedure produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// Unknown MAC admitted by policy; a record was created.
    Created,
    /// Known MAC admitted.
    Allowed,
    /// Unknown MAC with no applicable policy.
    NotFoundBlocked,
    /// Known MAC for which no VLAN could be derived.
    NoVlanBlocked,
}

/// One decision-log record.
struct DecisionRecord<'a> {
    outcome: Outcome,
    decision: &'a Decision,
    source: Option<ResolutionSource>,
    /// Name of the policy that fired, if any.
    policy: Option<&'a str>,
    enforced: bool,
    /// `None` when the branch does not write to the registry.
    persisted: Option<bool>,
}

impl fmt::Display for DecisionRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "control_plane: {} mac={} username={} vlan={} source={} policy={} enforced={} persisted={}",
            self.outcome,
            self.decision.mac.colon_lower(),
            self.decision.username.as_deref().unwrap_or("-"),
            self.decision
                .vlan
                .map_or_else(|| "-".to_owned(), |v| v.to_string()),
            source_label(self.source),
            self.policy.unwrap_or("-"),
            self.enforced,
            self.persisted
                .map_or_else(|| "skipped".to_owned(), |p| p.to_string()),
        )
    }
}

fn source_label(source: Option<ResolutionSource>) -> String {
    source.map_or_else(|| "none".to_owned(), |s| s.to_string())
}

// ── ControlPlane ─────────────────────────────────────────────────

/// The decision-and-enforcement engine.
///
/// Cheaply cloneable via `Arc<ControlPlaneInner>`; clones share the same
/// collaborators and may be driven from any number of tasks.
#[derive(Clone)]
pub struct ControlPlane {
    inner: Arc<ControlPlaneInner>,
}

struct ControlPlaneInner {
    registry: Arc<dyn DeviceRegistry>,
    policies: Arc<dyn PolicyStore>,
    profiles: Arc<dyn VlanProfileStore>,
    northbound: NorthboundApi,
    log: Arc<dyn LogSink>,
}

impl ControlPlane {
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        policies: Arc<dyn PolicyStore>,
        profiles: Arc<dyn VlanProfileStore>,
        driver: Arc<dyn SouthboundDriver>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            inner: Arc::new(ControlPlaneInner {
                registry,
                policies,
                profiles,
                northbound: NorthboundApi::new(driver),
                log,
            }),
        }
    }

    /// Build over a single store that backs devices, policies, and profiles.
    pub fn from_store<S>(
        store: Arc<S>,
        driver: Arc<dyn SouthboundDriver>,
        log: Arc<dyn LogSink>,
    ) -> Self
    where
        S: DeviceRegistry + PolicyStore + VlanProfileStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store, driver, log)
    }

    /// Name of the southbound driver in use.
    pub fn driver_name(&self) -> &'static str {
        self.inner.northbound.driver_name()
    }

    /// Decide, enforce, and record access for `raw_mac`.
    ///
    /// Malformed input fails with [`CoreError::InvalidMacFormat`] before
    /// any lookup. Read failures from the stores are returned as-is
    /// before anything is enforced. Enforcement and registry write
    /// failures are logged and never change the returned decision.
    pub async fn validate_and_program(&self, raw_mac: &str) -> Result<Decision, CoreError> {
        let mac = MacAddress::parse(raw_mac)?;
        let policies = self.inner.policies.list_policies()?;
        let resolver = PolicyResolver::new(&policies);

        match self.inner.registry.find_device(&mac)? {
            None => Ok(self.program_unknown(mac, &resolver).await),
            Some(device) => {
                let resolution = self.resolve_known(&resolver, &device)?;
                Ok(self.program_known(device, resolution).await)
            }
        }
    }

    async fn program_unknown(&self, mac: MacAddress, resolver: &PolicyResolver<'_>) -> Decision {
        let Some(resolution) = resolver.resolve(None, &mac) else {
            let decision = Decision::block(mac, None);
            let enforced = self.inner.northbound.quarantine(&mac).await;
            self.record(&DecisionRecord {
                outcome: Outcome::NotFoundBlocked,
                decision: &decision,
                source: None,
                policy: None,
                enforced,
                persisted: None,
            });
            return decision;
        };

        let decision = Decision::allow(mac, None, resolution.vlan);
        let enforced = self
            .inner
            .northbound
            .permit_on_vlan(&mac, resolution.vlan)
            .await;
        let persisted = self.persist(&decision);
        self.record(&DecisionRecord {
            outcome: Outcome::Created,
            decision: &decision,
            source: Some(resolution.source),
            policy: resolution.policy.as_deref(),
            enforced,
            persisted: Some(persisted),
        });
        decision
    }

    /// Policy first, then the user's VLAN profile, then the stored VLAN.
    fn resolve_known(
        &self,
        resolver: &PolicyResolver<'_>,
        device: &Device,
    ) -> Result<Option<Resolution>, CoreError> {
        let username = device.username.as_deref();
        if let Some(hit) = resolver.resolve(username, &device.mac) {
            return Ok(Some(hit));
        }
        if let Some(username) = username {
            if let Some(vlan) = self.inner.profiles.find_profile_vlan(username)? {
                return Ok(Some(Resolution::fallback(
                    vlan,
                    ResolutionSource::VlanProfile,
                )));
            }
        }
        Ok(device
            .vlan
            .filter(|_| device.authorized)
            .map(|vlan| Resolution::fallback(vlan, ResolutionSource::Stored)))
    }

    async fn program_known(&self, device: Device, resolution: Option<Resolution>) -> Decision {
        let Device { mac, username, .. } = device;

        let (decision, outcome, enforced) = match &resolution {
            Some(res) => (
                Decision::allow(mac, username, res.vlan),
                Outcome::Allowed,
                self.inner.northbound.permit_on_vlan(&mac, res.vlan).await,
            ),
            None => (
                Decision::block(mac, username),
                Outcome::NoVlanBlocked,
                self.inner.northbound.quarantine(&mac).await,
            ),
        };

        let persisted = self.persist(&decision);
        self.record(&DecisionRecord {
            outcome,
            decision: &decision,
            source: resolution.as_ref().map(|r| r.source),
            policy: resolution.as_ref().and_then(|r| r.policy.as_deref()),
            enforced,
            persisted: Some(persisted),
        });
        decision
    }

    fn persist(&self, decision: &Decision) -> bool {
        match self.inner.registry.upsert_device(decision.to_device()) {
            Ok(()) => true,
            Err(e) => {
                warn!(mac = %decision.mac, error = %e, "failed to persist device record");
                false
            }
        }
    }

    fn record(&self, record: &DecisionRecord<'_>) {
        if !record.enforced {
            warn!(mac = %record.decision.mac, outcome = %record.outcome, "enforcement did not take hold");
        }
        info!(
            outcome = %record.outcome,
            mac = %record.decision.mac.colon_lower(),
            username = record.decision.username.as_deref().unwrap_or("-"),
            vlan = record.decision.vlan.map(|v| v.get()),
            source = %source_label(record.source),
            policy = record.policy.unwrap_or("-"),
            enforced = record.enforced,
            persisted = ?record.persisted,
            "access decision"
        );
        self.inner.log.append(&record.to_string());
    }
}

impl fmt::Debug for ControlPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPlane")
            .field("driver", &self.driver_name())
            .finish_non_exhaustive()
    }
}
