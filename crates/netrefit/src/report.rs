//! Persisted run summaries.
//!
//! Every refresh run leaves a plain-text report behind: per-phase counts,
//! the verbatim error list, and full detail of every newly added device.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use netrefit_core::WorkflowResult;

/// Write the refresh run summary file and return its path.
pub fn write_refresh_summary(
    dir: &Path,
    result: &WorkflowResult,
) -> std::io::Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!(
        "refresh-summary-{}-{timestamp}.txt",
        result.network_id
    ));
    let mut f = std::fs::File::create(&path)?;

    writeln!(f, "NETWORK REFRESH SUMMARY")?;
    writeln!(f, "{}", "=".repeat(50))?;
    writeln!(f)?;
    writeln!(f, "Network ID: {}", result.network_id)?;
    writeln!(f, "Date/Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(f)?;

    writeln!(f, "PHASE RESULTS:")?;
    writeln!(f, "{}", "-".repeat(20))?;
    for phase in &result.phases {
        writeln!(f, "{}: {} affected", phase.phase, phase.affected)?;
    }
    writeln!(
        f,
        "static WAN configuration captured: {}",
        if result.static_wan_captured { "yes" } else { "no" }
    )?;
    writeln!(f)?;

    if !result.added_devices.is_empty() {
        writeln!(f, "NEW DEVICE DETAILS:")?;
        writeln!(f, "{}", "-".repeat(20))?;
        for device in &result.added_devices {
            writeln!(f, "  Device: {}", device.name)?;
            writeln!(f, "    Serial: {}", device.serial)?;
            writeln!(f, "    Category: {}", device.category)?;
            if let Some(note) = &device.preserved_ip_note {
                writeln!(f, "    Note: {note}")?;
            }
            writeln!(f)?;
        }
    }

    if result.errors.is_empty() {
        writeln!(f, "STATUS: SUCCESS - no errors encountered")?;
    } else {
        writeln!(f, "ERRORS ENCOUNTERED:")?;
        writeln!(f, "{}", "-".repeat(20))?;
        for error in &result.errors {
            writeln!(f, "  - {error}")?;
        }
    }
    writeln!(f)?;
    writeln!(f, "END OF REPORT")?;

    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use netrefit_core::{AddedDevice, DeviceCategory, Phase, PhaseResult};

    #[test]
    fn summary_lists_phases_errors_and_devices() {
        let result = WorkflowResult {
            network_id: "N_100".into(),
            phases: vec![PhaseResult {
                phase: Phase::RetireDevices,
                affected: 2,
                errors: vec!["failed to remove X".into()],
            }],
            errors: vec!["failed to remove X".into()],
            added_devices: vec![AddedDevice {
                serial: "Q2QN-1".into(),
                name: "MX-A-42".into(),
                category: DeviceCategory::Appliance,
                preserved_ip_note: Some("static WAN configuration preserved".into()),
            }],
            static_wan_captured: true,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = write_refresh_summary(dir.path(), &result).unwrap();
        let text = std::fs::read_to_string(path).unwrap();

        assert!(text.contains("retire-devices: 2 affected"));
        assert!(text.contains("failed to remove X"));
        assert!(text.contains("Serial: Q2QN-1"));
        assert!(text.contains("static WAN configuration preserved"));
        assert!(text.contains("captured: yes"));
    }
}
