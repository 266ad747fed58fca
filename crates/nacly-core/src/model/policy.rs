// ── Policy domain types ──
//
// Policies are authored elsewhere and only read by the engine. Their
// stored criteria blob is parsed exactly once, at load time, into the
// closed `PolicyCriteria` enum.

use serde::{Deserialize, Serialize};

use super::device::VlanId;
use super::mac::normalize_oui;
use crate::error::CoreError;

/// What a policy matches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PolicyCriteria {
    /// Exact username match.
    UsernameMatch(String),
    /// OUI match, hyphen-upper (`AA-BB-CC`).
    MacPrefixMatch(String),
    /// Catch-all marker.
    Default,
}

/// A named VLAN assignment rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRecord", into = "PolicyRecord")]
pub struct Policy {
    pub name: String,
    pub vlan: VlanId,
    pub criteria: Option<PolicyCriteria>,
}

impl Policy {
    pub fn new(name: impl Into<String>, vlan: VlanId, criteria: Option<PolicyCriteria>) -> Self {
        Self {
            name: name.into(),
            vlan,
            criteria,
        }
    }

    pub fn username(name: impl Into<String>, vlan: VlanId, username: impl Into<String>) -> Self {
        Self::new(name, vlan, Some(PolicyCriteria::UsernameMatch(username.into())))
    }

    /// Build a prefix policy, canonicalizing the OUI.
    pub fn mac_prefix(
        name: impl Into<String>,
        vlan: VlanId,
        prefix: &str,
    ) -> Result<Self, CoreError> {
        let oui = normalize_oui(prefix)?;
        Ok(Self::new(name, vlan, Some(PolicyCriteria::MacPrefixMatch(oui))))
    }

    pub fn default_policy(vlan: VlanId) -> Self {
        Self::new("default", vlan, Some(PolicyCriteria::Default))
    }

    /// Human-readable criteria summary for tables and logs.
    pub fn criteria_summary(&self) -> String {
        match &self.criteria {
            Some(PolicyCriteria::UsernameMatch(u)) => format!("username={u}"),
            Some(PolicyCriteria::MacPrefixMatch(p)) => format!("mac_prefix={p}"),
            Some(PolicyCriteria::Default) => "default".into(),
            None => "-".into(),
        }
    }
}

// ── Stored representation ───────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CriteriaRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mac_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PolicyRecord {
    name: String,
    vlan: VlanId,
    #[serde(default)]
    criteria: Option<CriteriaRecord>,
}

impl TryFrom<PolicyRecord> for Policy {
    type Error = CoreError;

    fn try_from(record: PolicyRecord) -> Result<Self, Self::Error> {
        if record.name.trim().is_empty() {
            return Err(CoreError::validation("policy name must not be empty"));
        }

        let criteria = match record.criteria {
            None => None,
            Some(CriteriaRecord {
                username,
                mac_prefix,
                default,
            }) => match (username, mac_prefix, default.unwrap_or(false)) {
                (None, None, false) => None,
                (Some(u), None, false) => Some(PolicyCriteria::UsernameMatch(u)),
                (None, Some(p), false) => Some(PolicyCriteria::MacPrefixMatch(
                    normalize_oui(&p).map_err(|_| {
                        CoreError::validation(format!(
                            "policy '{}': invalid mac_prefix '{p}'",
                            record.name
                        ))
                    })?,
                )),
                (None, None, true) => Some(PolicyCriteria::Default),
                _ => {
                    return Err(CoreError::validation(format!(
                        "policy '{}': criteria must name exactly one of username, mac_prefix, default",
                        record.name
                    )));
                }
            },
        };

        Ok(Self {
            name: record.name,
            vlan: record.vlan,
            criteria,
        })
    }
}

impl From<Policy> for PolicyRecord {
    fn from(policy: Policy) -> Self {
        let criteria = match policy.criteria {
            None => CriteriaRecord::default(),
            Some(PolicyCriteria::UsernameMatch(u)) => CriteriaRecord {
                username: Some(u),
                ..CriteriaRecord::default()
            },
            Some(PolicyCriteria::MacPrefixMatch(p)) => CriteriaRecord {
                mac_prefix: Some(p),
                ..CriteriaRecord::default()
            },
            Some(PolicyCriteria::Default) => CriteriaRecord {
                default: Some(true),
                ..CriteriaRecord::default()
            },
        };
        Self {
            name: policy.name,
            vlan: policy.vlan,
            criteria: Some(criteria),
        }
    }
}

/// Legacy username → VLAN fallback entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanProfile {
    pub username: String,
    pub vlan: VlanId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vlan(v: i64) -> VlanId {
        VlanId::new(v).unwrap()
    }

    #[test]
    fn parses_each_criteria_shape() {
        let policies: Vec<Policy> = serde_json::from_value(json!([
            { "name": "eng", "vlan": 20, "criteria": { "username": "alice" } },
            { "name": "cams", "vlan": 30, "criteria": { "mac_prefix": "aa:bb:cc" } },
            { "name": "default", "vlan": 5, "criteria": { "default": true } },
            { "name": "bare", "vlan": 6, "criteria": {} },
            { "name": "missing", "vlan": 7 },
        ]))
        .unwrap();

        assert_eq!(
            policies.iter().map(|p| p.criteria.clone()).collect::<Vec<_>>(),
            vec![
                Some(PolicyCriteria::UsernameMatch("alice".into())),
                Some(PolicyCriteria::MacPrefixMatch("AA-BB-CC".into())),
                Some(PolicyCriteria::Default),
                None,
                None,
            ]
        );
    }

    #[test]
    fn rejects_ambiguous_criteria() {
        let result = serde_json::from_value::<Policy>(json!({
            "name": "odd",
            "vlan": 10,
            "criteria": { "username": "alice", "mac_prefix": "AA-BB-CC" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_prefix_and_unknown_keys() {
        assert!(
            serde_json::from_value::<Policy>(json!({
                "name": "p", "vlan": 10, "criteria": { "mac_prefix": "nope" }
            }))
            .is_err()
        );
        assert!(
            serde_json::from_value::<Policy>(json!({
                "name": "p", "vlan": 10, "criteria": { "ssid": "corp" }
            }))
            .is_err()
        );
    }

    #[test]
    fn rejects_out_of_range_vlan() {
        assert!(
            serde_json::from_value::<Policy>(json!({ "name": "p", "vlan": 0 })).is_err()
        );
    }

    #[test]
    fn serializes_back_to_stored_shape() {
        let policy = Policy::mac_prefix("cams", vlan(30), "aa-bb-cc").unwrap();
        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({ "name": "cams", "vlan": 30, "criteria": { "mac_prefix": "AA-BB-CC" } })
        );

        let bare = Policy::new("bare", vlan(6), None);
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            json!({ "name": "bare", "vlan": 6, "criteria": {} })
        );
    }

    #[test]
    fn criteria_summary() {
        assert_eq!(
            Policy::username("eng", vlan(20), "alice").criteria_summary(),
            "username=alice"
        );
        assert_eq!(Policy::default_policy(vlan(5)).criteria_summary(), "default");
    }
}
