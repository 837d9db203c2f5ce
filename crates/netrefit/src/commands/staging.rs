//! Staging network command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use netrefit_core::binpack::BUCKET_CAPACITY;
use netrefit_core::workflow::confirm::AutoApprove;
use netrefit_core::{BatchDistribution, BucketStatus, Orchestrator, StagingBucket};

use crate::cli::{GlobalOpts, StagingArgs, StagingCommand};
use crate::config::ResolvedProfile;
use crate::confirm::PromptGate;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CapacityRow {
    #[tabled(rename = "Staging Network")]
    name: String,
    #[tabled(rename = "Network ID")]
    network_id: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Available")]
    available: usize,
    #[tabled(rename = "Occupants")]
    occupants: String,
}

impl From<&BucketStatus> for CapacityRow {
    fn from(s: &BucketStatus) -> Self {
        Self {
            name: s.bucket.name.clone(),
            network_id: s.bucket.network_id.clone(),
            used: s.error.as_ref().map_or_else(
                || format!("{}/{BUCKET_CAPACITY}", s.occupants.len()),
                |e| format!("error: {e}"),
            ),
            available: s.available,
            occupants: s
                .occupants
                .iter()
                .map(|d| d.serial.clone())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    resolved: ResolvedProfile,
    args: StagingArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let buckets = resolved.staging.clone();
    if buckets.is_empty() {
        return Err(CliError::Config {
            message: "no staging networks configured for this profile".into(),
        });
    }
    let model_prefix = resolved.rules.staging_model_prefix.clone();
    let gate = PromptGate::new(global.yes);
    let orch = Orchestrator::new(resolved.client, resolved.rules).with_confirmation(gate);

    match args.command {
        StagingCommand::Capacity => {
            let statuses = orch.survey_staging(&buckets, &model_prefix).await;
            let out = output::render_list(
                global.output,
                &statuses,
                |s| CapacityRow::from(s),
                |s| s.bucket.network_id.clone(),
            );
            println!("{out}");
            let total: usize = statuses.iter().map(|s| s.available).sum();
            println!("\nTotal available slots: {total}");
            Ok(())
        }

        StagingCommand::Distribute { serials } => {
            let distribution = orch
                .distribute_batch(&serials, &buckets, &model_prefix)
                .await?;
            print_distribution(&distribution, &buckets);
            Ok(())
        }

        StagingCommand::Remove { network, serials } => {
            let network_id = resolve_bucket(&buckets, &network);
            let (removed, failed) = orch.remove_staged(&network_id, &serials).await;
            for serial in &removed {
                println!("  {} {serial}", "✓".green());
            }
            for serial in &failed {
                println!("  {} {serial}", "✗".red());
            }
            println!("Removed {}, failed {}", removed.len(), failed.len());
            Ok(())
        }

        StagingCommand::RemoveAll { force } => {
            let report = if force {
                // Explicit --force bypasses the prompt entirely.
                let orch = orch.with_confirmation(AutoApprove);
                orch.remove_all_staged(&buckets, &model_prefix).await
            } else {
                orch.remove_all_staged(&buckets, &model_prefix).await
            };

            if report.cancelled {
                println!("Operation cancelled.");
                return Ok(());
            }
            for (bucket, (removed, failed)) in &report.buckets {
                println!("{bucket}:");
                for serial in removed {
                    println!("  {} {serial}", "✓".green());
                }
                for serial in failed {
                    println!("  {} {serial}", "✗".red());
                }
            }
            println!(
                "Total removed: {}, failed: {}",
                report.total_removed, report.total_failed
            );
            Ok(())
        }
    }
}

/// Accept either a configured staging network name or a raw network id.
fn resolve_bucket(buckets: &[StagingBucket], input: &str) -> String {
    buckets
        .iter()
        .find(|b| b.name == input)
        .map_or_else(|| input.to_owned(), |b| b.network_id.clone())
}

fn print_distribution(distribution: &BatchDistribution, buckets: &[StagingBucket]) {
    if distribution.cancelled {
        println!("Operation cancelled; existing devices should be removed first.");
        return;
    }
    if let Some(missing) = distribution.shortfall {
        println!(
            "{} Batch exceeds staging capacity by {missing} slot(s); nothing was claimed.",
            "✗".red()
        );
        return;
    }

    let total: usize = distribution.assignments.values().map(Vec::len).sum();
    println!(
        "{} Distributed {total} device(s) across {} network(s).",
        "✓".green(),
        distribution.assignments.len()
    );
    for (bucket, serials) in &distribution.assignments {
        println!("\n{bucket}:");
        for serial in serials {
            println!("  {} {serial}", "✓".green());
        }
        // Removal one-liner for after the firmware sync completes.
        if let Some(network_id) = buckets
            .iter()
            .find(|b| &b.name == bucket)
            .map(|b| b.network_id.as_str())
        {
            println!(
                "  to remove later: netrefit staging remove --network {network_id} {}",
                serials.join(" ")
            );
        }
    }

    if !distribution.unassigned.is_empty() {
        println!("\nFailed to place:");
        for serial in &distribution.unassigned {
            println!("  {} {serial}", "✗".red());
        }
    }
}
