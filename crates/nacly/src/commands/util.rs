//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use nacly_core::{MacAddress, VlanId};

use crate::error::CliError;

/// Parse a MAC argument, mapping failures to the `invalid_mac` diagnostic.
pub fn parse_mac(raw: &str) -> Result<MacAddress, CliError> {
    Ok(MacAddress::parse(raw)?)
}

/// Validate a VLAN argument.
pub fn parse_vlan(raw: i64) -> Result<VlanId, CliError> {
    Ok(VlanId::new(raw)?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the operation is refused.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read a whole text file.
pub fn read_text_file(path: &Path) -> Result<String, CliError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Read and parse a JSON file.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = read_text_file(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// `-` for absent values in table cells.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}
