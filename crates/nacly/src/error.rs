//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use nacly_config::ConfigError;
use nacly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("'{input}' is not a valid MAC address")]
    #[diagnostic(
        code(nacly::invalid_mac),
        help("Use six hex pairs separated uniformly, e.g. AA-BB-CC-DD-EE-FF or aa:bb:cc:dd:ee:ff")
    )]
    InvalidMac { input: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nacly::validation))]
    Validation { field: String, reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nacly::not_found),
        help("Run: nacly {list_command} to see existing {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(
        code(nacly::conflict),
        help("Pass --yes (-y) to overwrite it.")
    )]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    // ── ACL ──────────────────────────────────────────────────────────
    #[error("ACL file has {count} invalid entries")]
    #[diagnostic(
        code(nacly::acl_invalid),
        help("Rules take the form: (permit|deny) (ip|tcp|udp|icmp) <src> <dst> [eq <port>]")
    )]
    AclInvalid { count: usize },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    #[diagnostic(
        code(nacly::storage),
        help("Check that the data directory exists and is writable (--data-dir).")
    )]
    Storage(#[source] CoreError),

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(nacly::config), help("Inspect the effective settings with: nacly config show"))]
    Config(Box<figment::Error>),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(nacly::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(nacly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(nacly::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(nacly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidMac { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidMacFormat { input } => CliError::InvalidMac { input },

            CoreError::InvalidVlan { value } => CliError::Validation {
                field: "vlan".into(),
                reason: format!("{value} is outside 1-4094"),
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            other @ (CoreError::EnforcementFailure { .. }
            | CoreError::PersistenceFailure { .. }
            | CoreError::Io { .. }
            | CoreError::Serialization { .. }) => CliError::Storage(other),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::ConfigWrite(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn invalid_mac_is_a_usage_error() {
        let err = CliError::from(nacly_core::MacAddress::parse("nope").unwrap_err());
        assert!(matches!(err, CliError::InvalidMac { .. }));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn not_found_and_conflict_codes() {
        let nf = CliError::NotFound {
            resource_type: "policy".into(),
            identifier: "eng".into(),
            list_command: "policies list".into(),
        };
        assert_eq!(nf.exit_code(), exit_code::NOT_FOUND);

        let conflict = CliError::Conflict {
            resource_type: "config file".into(),
            identifier: "/tmp/x".into(),
        };
        assert_eq!(conflict.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn storage_failures_are_general() {
        let err = CliError::from(CoreError::PersistenceFailure {
            key: "AA-BB-CC-DD-EE-FF".into(),
            reason: "disk full".into(),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
