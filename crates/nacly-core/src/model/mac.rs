// ── MAC address identity ──
//
// Every MAC that enters the engine is parsed into `MacAddress` first.
// Two canonical renderings exist: colon-lowercase for southbound
// enforcement calls, hyphen-uppercase for storage keys and policy
// prefixes. All comparisons happen on one of these two forms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

const MAC_TEXT_LEN: usize = 17;

/// A validated 48-bit MAC address.
///
/// Accepts `aa:bb:cc:dd:ee:ff` or `AA-BB-CC-DD-EE-FF` in either case,
/// provided all five separators are the same character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Parse a MAC from text. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let text = raw.trim();
        if text.len() != MAC_TEXT_LEN || !text.is_ascii() {
            return Err(CoreError::invalid_mac(raw));
        }

        let bytes = text.as_bytes();
        let separator = bytes[2];
        if separator != b':' && separator != b'-' {
            return Err(CoreError::invalid_mac(raw));
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            let start = i * 3;
            if i > 0 && bytes[start - 1] != separator {
                return Err(CoreError::invalid_mac(raw));
            }
            let pair = &text[start..start + 2];
            if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(CoreError::invalid_mac(raw));
            }
            *octet = u8::from_str_radix(pair, 16).map_err(|_| CoreError::invalid_mac(raw))?;
        }

        Ok(Self(octets))
    }

    pub fn from_octets(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// `aa:bb:cc:dd:ee:ff` — the form handed to southbound drivers.
    pub fn colon_lower(&self) -> String {
        self.render(":", false)
    }

    /// `AA-BB-CC-DD-EE-FF` — the form used as the registry key.
    pub fn hyphen_upper(&self) -> String {
        self.render("-", true)
    }

    /// Organizationally unique identifier, hyphen-upper (`AA-BB-CC`).
    pub fn oui(&self) -> String {
        let [a, b, c, ..] = self.0;
        format!("{a:02X}-{b:02X}-{c:02X}")
    }

    fn render(&self, separator: &str, upper: bool) -> String {
        self.0
            .iter()
            .map(|octet| {
                if upper {
                    format!("{octet:02X}")
                } else {
                    format!("{octet:02x}")
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hyphen_upper())
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.hyphen_upper()
    }
}

// ── Free-function normalizers ───────────────────────────────────────

/// Normalize any accepted MAC spelling to `aa:bb:cc:dd:ee:ff`.
pub fn to_colon_lower(input: &str) -> Result<String, CoreError> {
    MacAddress::parse(input).map(|mac| mac.colon_lower())
}

/// Normalize any accepted MAC spelling to `AA-BB-CC-DD-EE-FF`.
pub fn to_hyphen_upper(input: &str) -> Result<String, CoreError> {
    MacAddress::parse(input).map(|mac| mac.hyphen_upper())
}

/// Canonicalize a three-octet OUI prefix (`aa:bb:cc` / `AA-BB-CC`) to
/// hyphen-upper form.
pub fn normalize_oui(input: &str) -> Result<String, CoreError> {
    let text = input.trim();
    if text.len() != 8 || !text.is_ascii() {
        return Err(CoreError::invalid_mac(input));
    }
    // Reuse the full-address parser by padding the prefix with zero octets.
    let sep = &text[2..3];
    let probe = format!("{text}{sep}00{sep}00{sep}00");
    MacAddress::parse(&probe)
        .map(|mac| mac.oui())
        .map_err(|_| CoreError::invalid_mac(input))
}
