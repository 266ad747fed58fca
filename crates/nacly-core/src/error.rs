// ── Core error types ──
//
// Errors surfaced by nacly-core. `ControlPlane::validate_and_program`
// returns `InvalidMacFormat` for bad input and store read failures;
// enforcement and registry write failures are logged and absorbed.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid MAC address format: '{input}' (expected AA-BB-CC-DD-EE-FF or aa:bb:cc:dd:ee:ff)")]
    InvalidMacFormat { input: String },

    #[error("Invalid VLAN id {value}: must be between 1 and 4094")]
    InvalidVlan { value: i64 },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Side-channel errors ──────────────────────────────────────────
    /// Rendered in the decision log's `southbound: failed` line.
    #[error("cmd={command} error={reason}")]
    EnforcementFailure { command: String, reason: String },

    #[error("Persistence failed for {key}: {reason}")]
    PersistenceFailure { key: String, reason: String },

    #[error("Not found: {entity_type} '{identifier}'")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data in {path}: {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    pub(crate) fn invalid_mac(input: impl Into<String>) -> Self {
        Self::InvalidMacFormat {
            input: input.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
