// ── Device domain types ──

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;

/// Hardware category, derived from the model string's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DeviceCategory {
    /// Security appliance / gateway (MX family).
    Appliance,
    /// Access switch (MS family).
    Switch,
    /// Wireless access point (MR and CW families).
    AccessPoint,
    /// Environmental sensor (MT family).
    Sensor,
    Other,
}

impl DeviceCategory {
    /// Classify a model string by its family prefix, case-insensitively.
    pub fn from_model(model: &str) -> Self {
        let upper = model.to_uppercase();
        if upper.starts_with("MX") {
            Self::Appliance
        } else if upper.starts_with("MS") {
            Self::Switch
        } else if upper.starts_with("MR") || upper.starts_with("CW") {
            Self::AccessPoint
        } else if upper.starts_with("MT") {
            Self::Sensor
        } else {
            Self::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Appliance => "appliance",
            Self::Switch => "switch",
            Self::AccessPoint => "access point",
            Self::Sensor => "sensor",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A device as read from the control plane. Snapshot of one moment --
/// never held longer than a single workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Unique, immutable hardware serial.
    pub serial: String,
    /// Model string, empty when the control plane omits it.
    pub model: String,
    pub mac: Option<MacAddress>,
    pub name: Option<String>,
    pub network_id: Option<String>,
    pub address: Option<String>,
}

impl DeviceRecord {
    pub fn category(&self) -> DeviceCategory {
        DeviceCategory::from_model(&self.model)
    }

    /// True if the model starts with any of the given prefixes
    /// (case-insensitive).
    pub fn model_matches(&self, prefixes: &[String]) -> bool {
        let upper = self.model.to_uppercase();
        prefixes.iter().any(|p| upper.starts_with(&p.to_uppercase()))
    }

    /// Display name, falling back to the serial.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_model_prefix() {
        assert_eq!(DeviceCategory::from_model("MX64"), DeviceCategory::Appliance);
        assert_eq!(DeviceCategory::from_model("MS120-8LP"), DeviceCategory::Switch);
        assert_eq!(DeviceCategory::from_model("MR33"), DeviceCategory::AccessPoint);
        assert_eq!(DeviceCategory::from_model("CW9162I"), DeviceCategory::AccessPoint);
        assert_eq!(DeviceCategory::from_model("MT40"), DeviceCategory::Sensor);
        assert_eq!(DeviceCategory::from_model("Z3"), DeviceCategory::Other);
    }

    #[test]
    fn category_is_case_insensitive() {
        assert_eq!(DeviceCategory::from_model("mx67c"), DeviceCategory::Appliance);
    }
}
