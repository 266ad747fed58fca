// ── ACL rule validation ──
//
// Checks a batch of textual ACL entries against a small grammar and
// returns them in normalized form:
//
//   (permit|deny) (ip|tcp|udp|icmp) <src> <dst> [eq <port>]
//
// Keywords are case-insensitive. `any` and `*` both normalize to `any`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AclAction {
    Permit,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AclProtocol {
    Ip,
    Tcp,
    Udp,
    Icmp,
}

impl AclProtocol {
    /// Whether `eq <port>` may follow this protocol.
    pub fn has_ports(self) -> bool {
        matches!(self, Self::Tcp | Self::Udp)
    }
}

/// A normalized ACL entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub action: AclAction,
    pub protocol: AclProtocol,
    pub src: String,
    pub dst: String,
    pub port: Option<u16>,
    /// The rule text as submitted (trimmed).
    pub raw: String,
    pub description: Option<String>,
}

/// Validation result for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclReport {
    pub ok: bool,
    pub issues: Vec<String>,
    pub rules: Vec<AclRule>,
}

impl AclReport {
    fn rejected(issue: impl Into<String>) -> Self {
        Self {
            ok: false,
            issues: vec![issue.into()],
            rules: Vec::new(),
        }
    }
}

/// Why a single rule string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    Syntax,
    PortNotAllowed,
    PortOutOfRange(String),
}

/// Validate a JSON payload that should be an array of
/// `{ "rule": "...", "description": "..." }` objects.
///
/// Valid entries are normalized; every invalid entry contributes one
/// indexed issue. `ok` is true only when there are no issues.
pub fn validate_acls(payload: &Value) -> AclReport {
    let Some(items) = payload.as_array() else {
        return AclReport::rejected("Payload should be an array of ACL objects");
    };

    let mut issues = Vec::new();
    let mut rules = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            issues.push(format!("ACL[{i}]: must be an object"));
            continue;
        };
        let rule = obj
            .get("rule")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if rule.is_empty() {
            issues.push(format!("ACL[{i}]: missing 'rule'"));
            continue;
        }
        let description = obj.get("description").and_then(|d| match d {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

        match parse_rule(rule) {
            Ok(mut parsed) => {
                parsed.description = description;
                rules.push(parsed);
            }
            Err(RuleError::Syntax) => {
                issues.push(format!("ACL[{i}]: unsupported rule syntax: '{rule}'"));
            }
            Err(RuleError::PortNotAllowed) => {
                issues.push(format!("ACL[{i}]: 'eq <port>' only valid for tcp/udp"));
            }
            Err(RuleError::PortOutOfRange(port)) => {
                issues.push(format!("ACL[{i}]: port {port} out of range (0-65535)"));
            }
        }
    }

    AclReport {
        ok: issues.is_empty(),
        issues,
        rules,
    }
}

/// Parse one rule string. `description` is left empty.
pub fn parse_rule(rule: &str) -> Result<AclRule, RuleError> {
    let tokens: Vec<&str> = rule.split_whitespace().collect();
    let (head, port_clause) = match tokens.as_slice() {
        [a, p, s, d] => ([*a, *p, *s, *d], None),
        [a, p, s, d, eq, port] if eq.eq_ignore_ascii_case("eq") => {
            ([*a, *p, *s, *d], Some(*port))
        }
        _ => return Err(RuleError::Syntax),
    };
    let [action, protocol, src, dst] = head;

    let action: AclAction = action.parse().map_err(|_| RuleError::Syntax)?;
    let protocol: AclProtocol = protocol.parse().map_err(|_| RuleError::Syntax)?;

    let port = match port_clause {
        None => None,
        Some(p) if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(RuleError::Syntax);
        }
        Some(_) if !protocol.has_ports() => return Err(RuleError::PortNotAllowed),
        Some(p) => Some(
            p.parse::<u16>()
                .map_err(|_| RuleError::PortOutOfRange(p.to_owned()))?,
        ),
    };

    Ok(AclRule {
        action,
        protocol,
        src: normalize_addr(src),
        dst: normalize_addr(dst),
        port,
        raw: rule.to_owned(),
        description: None,
    })
}

fn normalize_addr(addr: &str) -> String {
    let addr = addr.trim().to_ascii_lowercase();
    if addr == "*" { "any".to_owned() } else { addr }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn normalizes_valid_rules() {
        let report = validate_acls(&json!([
            { "rule": "PERMIT TCP 10.0.0.0/8 * eq 443", "description": "https" },
            { "rule": "  deny ip Any 192.168.1.1  " },
        ]));

        assert!(report.ok);
        assert!(report.issues.is_empty());
        assert_eq!(
            report.rules,
            vec![
                AclRule {
                    action: AclAction::Permit,
                    protocol: AclProtocol::Tcp,
                    src: "10.0.0.0/8".into(),
                    dst: "any".into(),
                    port: Some(443),
                    raw: "PERMIT TCP 10.0.0.0/8 * eq 443".into(),
                    description: Some("https".into()),
                },
                AclRule {
                    action: AclAction::Deny,
                    protocol: AclProtocol::Ip,
                    src: "any".into(),
                    dst: "192.168.1.1".into(),
                    port: None,
                    raw: "deny ip Any 192.168.1.1".into(),
                    description: None,
                },
            ]
        );
    }

    #[test]
    fn reports_each_bad_entry_by_index() {
        let report = validate_acls(&json!([
            { "rule": "permit udp any any eq 53" },
            "deny ip any any",
            { "description": "no rule" },
            { "rule": "allow ip any any" },
            { "rule": "permit icmp any any eq 8" },
            { "rule": "permit tcp any any eq 70000" },
        ]));

        assert!(!report.ok);
        assert_eq!(report.rules.len(), 1);
        assert_eq!(
            report.issues,
            vec![
                "ACL[1]: must be an object".to_owned(),
                "ACL[2]: missing 'rule'".to_owned(),
                "ACL[3]: unsupported rule syntax: 'allow ip any any'".to_owned(),
                "ACL[4]: 'eq <port>' only valid for tcp/udp".to_owned(),
                "ACL[5]: port 70000 out of range (0-65535)".to_owned(),
            ]
        );
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let report = validate_acls(&json!({ "rule": "permit ip any any" }));
        assert!(!report.ok);
        assert_eq!(
            report.issues,
            vec!["Payload should be an array of ACL objects".to_owned()]
        );
        assert!(report.rules.is_empty());
    }

    #[test]
    fn malformed_port_clauses_are_syntax_errors() {
        assert_eq!(
            parse_rule("permit tcp any any eq https"),
            Err(RuleError::Syntax)
        );
        assert_eq!(parse_rule("permit tcp any any lt 80"), Err(RuleError::Syntax));
        assert_eq!(parse_rule("permit tcp any"), Err(RuleError::Syntax));
        assert_eq!(parse_rule("permit gre any any"), Err(RuleError::Syntax));
    }

    #[test]
    fn empty_array_is_ok() {
        let report = validate_acls(&json!([]));
        assert!(report.ok);
        assert!(report.rules.is_empty());
    }

    #[test]
    fn report_serializes_with_null_port() {
        let report = validate_acls(&json!([{ "rule": "deny icmp any any" }]));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["rules"][0]["port"], Value::Null);
        assert_eq!(value["rules"][0]["protocol"], "icmp");
        assert_eq!(value["ok"], true);
    }
}
