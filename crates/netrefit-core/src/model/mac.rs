// ── MAC address normalization ──
//
// Assignment tables key on MAC, but the dashboard is inconsistent about
// the format it hands back: colon-separated from the device endpoints,
// sometimes bare hex in older assignment tables. Normalizing at the type
// boundary means the rest of the crate can compare MACs with plain `==`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MAC address, normalized to lowercase colon-separated form
/// (`aa:bb:cc:dd:ee:ff`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare 12-digit hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let bare: String = raw
            .as_ref()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_hexdigit())
            .collect();

        if bare.len() == 12 {
            let grouped = bare
                .as_bytes()
                .chunks(2)
                .map(String::from_utf8_lossy)
                .collect::<Vec<_>>()
                .join(":");
            Self(grouped)
        } else {
            // Not a well-formed MAC; keep the lowercased input so lookups
            // still behave consistently.
            Self(raw.as_ref().to_lowercase())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separator() {
        let mac = MacAddress::new("AA-BB-CC-DD-EE-FF");
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn regroups_bare_hex() {
        let mac = MacAddress::new("00180A112233");
        assert_eq!(mac.as_str(), "00:18:0a:11:22:33");
    }

    #[test]
    fn colon_and_bare_forms_compare_equal() {
        assert_eq!(MacAddress::new("00:18:0a:11:22:33"), MacAddress::new("00180a112233"));
    }

    #[test]
    fn from_str_round_trip() {
        let mac: MacAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }
}
