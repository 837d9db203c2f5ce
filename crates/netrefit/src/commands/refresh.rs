//! Device-refresh command handler.

use std::collections::HashSet;
use std::path::Path;

use owo_colors::OwoColorize;

use netrefit_core::{ControlPlane, Orchestrator, RefreshPlan, WorkflowResult, classify};

use crate::cli::{GlobalOpts, RefreshArgs};
use crate::config::ResolvedProfile;
use crate::confirm::PromptGate;
use crate::error::CliError;
use crate::report;

use super::util;

pub async fn handle(
    resolved: ResolvedProfile,
    args: RefreshArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let plan: RefreshPlan = util::read_json_file(&args.plan)?;
    let gate = PromptGate::new(global.yes);

    let orch = Orchestrator::new(resolved.client, resolved.rules).with_confirmation(gate);

    print_preview(&orch, &args.network, &plan).await?;

    if !gate_confirm(&gate, &args.network) {
        println!("Refresh cancelled.");
        return Ok(());
    }

    let result = orch.run_refresh(&args.network, &plan).await;
    print_summary(&result);

    let dir = args.summary_dir.as_deref().unwrap_or(Path::new("."));
    let path = report::write_refresh_summary(dir, &result)?;
    println!("\nDetailed summary saved to: {}", path.display());

    Ok(())
}

fn gate_confirm(gate: &PromptGate, network: &str) -> bool {
    use netrefit_core::ConfirmationGate;
    gate.confirm(&format!("Proceed with refreshing network {network}?"))
}

async fn print_preview<C: ControlPlane>(
    orch: &Orchestrator<C>,
    network_id: &str,
    plan: &RefreshPlan,
) -> Result<(), CliError> {
    let devices = orch.plane().list_devices(network_id).await?;
    let classification = classify(devices, orch.rules(), &HashSet::new());

    println!("{}", "DEVICES TO BE RETIRED:".bold());
    if classification.to_retire.is_empty() {
        println!("  - none");
    }
    for device in &classification.to_retire {
        println!(
            "  - {} - {} ({})",
            device.model,
            device.display_name(),
            device.serial
        );
    }

    println!("\n{}", "DEVICES TO BE ADDED:".bold());
    let additions: Vec<_> = plan.additions().collect();
    if additions.is_empty() {
        println!("  - none");
    }
    for (serial, name) in &additions {
        println!("  - {name} ({serial})");
    }

    if let Some(target) = plan.rename_target() {
        println!("\nExisting sensors will be renamed to: {target}");
    }
    if let Some(address) = plan.address.as_ref().and_then(|a| a.formatted()) {
        println!("Address for all devices: {address}");
    }
    if !plan.switch_names.is_empty() {
        println!("Switch names: {}", plan.switch_names.join(", "));
    }
    println!();

    Ok(())
}

fn print_summary(result: &WorkflowResult) {
    println!("\n{}", "REFRESH SUMMARY".bold());
    println!("Network: {}", result.network_id);
    for phase in &result.phases {
        println!("  {} {}: {}", "✓".green(), phase.phase, phase.affected);
    }

    if result.errors.is_empty() {
        println!("\n{}", "Refresh completed without errors.".green());
    } else {
        println!(
            "\n{} {} error(s) encountered:",
            "⚠".yellow(),
            result.errors.len()
        );
        for error in &result.errors {
            println!("  - {error}");
        }
    }
}
