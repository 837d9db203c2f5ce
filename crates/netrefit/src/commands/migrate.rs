//! Template-migration command handler.

use owo_colors::OwoColorize;

use netrefit_core::{ConfirmationGate, DEFAULT_VLAN_IDS, Orchestrator};

use crate::cli::{GlobalOpts, MigrateArgs};
use crate::config::ResolvedProfile;
use crate::confirm::PromptGate;
use crate::error::CliError;

pub async fn handle(
    resolved: ResolvedProfile,
    args: MigrateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let gate = PromptGate::new(global.yes);

    println!(
        "About to move network {} onto template {}.",
        args.network.bold(),
        args.template.bold()
    );
    if !gate.confirm("Proceed with the template migration?") {
        println!("Migration cancelled.");
        return Ok(());
    }

    let vlan_ids = args.vlans.unwrap_or_else(|| DEFAULT_VLAN_IDS.to_vec());
    let orch =
        Orchestrator::new(resolved.client, resolved.rules).with_confirmation(gate);

    let result = orch
        .run_template_migration(&args.network, &args.template, &vlan_ids)
        .await?;

    println!("\n{}", "MIGRATION SUMMARY".bold());
    for phase in &result.phases {
        println!("  {} {}: {}", "✓".green(), phase.phase, phase.affected);
    }
    if result.errors.is_empty() {
        println!("\n{}", "Migration completed without errors.".green());
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

    Ok(())
}
