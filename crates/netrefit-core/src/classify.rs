// ── Device lifecycle classification ──
//
// Pure rules mapping an inventory snapshot to lifecycle categories.
// Everything downstream (capture, retirement, replay) keys off this
// partition, so the three sets must stay disjoint.

use std::collections::HashSet;

use serde::Deserialize;

use crate::model::DeviceRecord;

/// Model-pattern rule sets driving classification and preservation.
///
/// The defaults mirror the fleet this tool was built for: MS120/MS130
/// access switches stay in place, first-generation edge hardware goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelRules {
    /// Model prefixes of identity-bearing devices that are never retired.
    pub preserved_prefixes: Vec<String>,
    /// Model prefixes of legacy hardware eligible for retirement.
    pub retireable_prefixes: Vec<String>,
    /// Assignment display names preserved even without a matching MAC
    /// (reservations created before MAC-based tracking existed).
    pub preserve_assignment_names: Vec<String>,
    /// Model prefixes of replacement appliances whose second port is
    /// converted to a WAN uplink after claiming.
    pub dual_wan_prefixes: Vec<String>,
    /// Reserved ranges whose comment equals this tag (case-insensitive)
    /// are dropped during a refresh.
    pub reserved_range_tag: String,
    /// Model prefix of the device family parked on staging networks.
    pub staging_model_prefix: String,
}

impl Default for ModelRules {
    fn default() -> Self {
        Self {
            preserved_prefixes: vec!["MS120".into(), "MS130".into()],
            retireable_prefixes: vec![
                "MX64".into(),
                "MR33".into(),
                "MR36".into(),
                "CW9162".into(),
            ],
            preserve_assignment_names: vec![
                "MS120-A".into(),
                "MS120-B".into(),
                "MS130-A".into(),
                "MS130-B".into(),
            ],
            dual_wan_prefixes: vec!["MX67".into()],
            reserved_range_tag: "iboot".into(),
            staging_model_prefix: "MX67".into(),
        }
    }
}

/// Disjoint lifecycle partition of one inventory snapshot.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub to_preserve: Vec<DeviceRecord>,
    pub to_retire: Vec<DeviceRecord>,
    pub unclassified: Vec<DeviceRecord>,
}

/// Partition an inventory snapshot by the configured model rules.
///
/// Preserved match wins over retireable. A device whose serial is in
/// `just_added` is never retired even if its model matches a legacy
/// prefix: under eventually-consistent reads a device claimed moments ago
/// can appear with stale attributes, and acting on it would undo the very
/// change this run just made. Such devices land in `unclassified`.
pub fn classify(
    devices: Vec<DeviceRecord>,
    rules: &ModelRules,
    just_added: &HashSet<String>,
) -> Classification {
    let mut out = Classification::default();

    for device in devices {
        if device.model_matches(&rules.preserved_prefixes) {
            out.to_preserve.push(device);
        } else if device.model_matches(&rules.retireable_prefixes) {
            if just_added.contains(&device.serial) {
                out.unclassified.push(device);
            } else {
                out.to_retire.push(device);
            }
        } else {
            out.unclassified.push(device);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MacAddress;

    fn device(serial: &str, model: &str) -> DeviceRecord {
        DeviceRecord {
            serial: serial.into(),
            model: model.into(),
            mac: Some(MacAddress::new("00:18:0a:00:00:01")),
            name: None,
            network_id: None,
            address: None,
        }
    }

    #[test]
    fn partitions_are_disjoint() {
        let devices = vec![
            device("S1", "MS120-8"),
            device("S2", "MX64"),
            device("S3", "MX67C"),
            device("S4", "mr33"),
        ];
        let c = classify(devices, &ModelRules::default(), &HashSet::new());

        assert_eq!(c.to_preserve.len(), 1);
        assert_eq!(c.to_retire.len(), 2);
        assert_eq!(c.unclassified.len(), 1);

        let retire: HashSet<_> = c.to_retire.iter().map(|d| &d.serial).collect();
        assert!(c.to_preserve.iter().all(|d| !retire.contains(&d.serial)));
        assert!(c.unclassified.iter().all(|d| !retire.contains(&d.serial)));
    }

    #[test]
    fn matching_is_prefix_based_and_case_insensitive() {
        let c = classify(
            vec![device("S1", "cw9162i")],
            &ModelRules::default(),
            &HashSet::new(),
        );
        assert_eq!(c.to_retire.len(), 1);

        // CW9164 shares no configured prefix.
        let c = classify(
            vec![device("S1", "CW9164")],
            &ModelRules::default(),
            &HashSet::new(),
        );
        assert!(c.to_retire.is_empty());
    }

    #[test]
    fn just_added_devices_are_never_retired() {
        let just_added: HashSet<String> = ["S2".to_owned()].into();
        let c = classify(
            vec![device("S1", "MX64"), device("S2", "MX64")],
            &ModelRules::default(),
            &just_added,
        );

        assert_eq!(c.to_retire.len(), 1);
        assert_eq!(c.to_retire[0].serial, "S1");
        assert_eq!(c.unclassified.len(), 1);
        assert_eq!(c.unclassified[0].serial, "S2");
    }

    #[test]
    fn preserved_wins_over_retireable() {
        let mut rules = ModelRules::default();
        rules.retireable_prefixes.push("MS120".into());
        let c = classify(vec![device("S1", "MS120-8")], &rules, &HashSet::new());

        assert_eq!(c.to_preserve.len(), 1);
        assert!(c.to_retire.is_empty());
    }
}
