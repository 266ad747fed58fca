// ── Policy resolution ──
//
// Ordered precedence over the full policy set, first hit wins:
//   1. username match (only when a username is known)
//   2. OUI prefix match
//   3. the policy named "default"
// Ties within a tier go to the lexicographically smallest policy name.

use serde::Serialize;
use strum::Display;

use crate::model::{MacAddress, Policy, PolicyCriteria, VlanId};

/// Name of the catch-all policy consulted in the last tier.
pub const DEFAULT_POLICY_NAME: &str = "default";

/// Which rule produced a VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionSource {
    Username,
    MacPrefix,
    Default,
    VlanProfile,
    Stored,
}

/// A resolved VLAN together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub vlan: VlanId,
    pub source: ResolutionSource,
    /// Policy that matched; `None` for profile and stored-VLAN fallbacks.
    pub policy: Option<String>,
}

impl Resolution {
    pub(crate) fn fallback(vlan: VlanId, source: ResolutionSource) -> Self {
        Self {
            vlan,
            source,
            policy: None,
        }
    }
}

/// Stateless resolver over a borrowed policy snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PolicyResolver<'a> {
    policies: &'a [Policy],
}

impl<'a> PolicyResolver<'a> {
    pub fn new(policies: &'a [Policy]) -> Self {
        Self { policies }
    }

    /// Resolve a VLAN for `(username, mac)`, or `None` when no tier matches.
    pub fn resolve(&self, username: Option<&str>, mac: &MacAddress) -> Option<Resolution> {
        if let Some(username) = username {
            let hit = self.best_match(
                |c| matches!(c, PolicyCriteria::UsernameMatch(u) if u == username),
            );
            if let Some(policy) = hit {
                return Some(Self::hit(policy, ResolutionSource::Username));
            }
        }

        let oui = mac.oui();
        let hit =
            self.best_match(|c| matches!(c, PolicyCriteria::MacPrefixMatch(p) if *p == oui));
        if let Some(policy) = hit {
            return Some(Self::hit(policy, ResolutionSource::MacPrefix));
        }

        self.policies
            .iter()
            .find(|p| p.name == DEFAULT_POLICY_NAME)
            .map(|p| Self::hit(p, ResolutionSource::Default))
    }

    /// Convenience wrapper returning only the VLAN.
    pub fn resolve_vlan(&self, username: Option<&str>, mac: &MacAddress) -> Option<VlanId> {
        self.resolve(username, mac).map(|r| r.vlan)
    }

    fn best_match(&self, pred: impl Fn(&PolicyCriteria) -> bool) -> Option<&'a Policy> {
        self.policies
            .iter()
            .filter(|p| p.criteria.as_ref().is_some_and(&pred))
            .min_by(|a, b| a.name.cmp(&b.name))
    }

    fn hit(policy: &Policy, source: ResolutionSource) -> Resolution {
        Resolution {
            vlan: policy.vlan,
            source,
            policy: Some(policy.name.clone()),
        }
    }
}
