//! Device inventory command handlers.

use tabled::Tabled;

use netrefit_core::{ControlPlane, DeviceRecord};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config::ResolvedProfile;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(d: &DeviceRecord) -> Self {
        Self {
            serial: d.serial.clone(),
            model: d.model.clone(),
            category: d.category().to_string(),
            name: d.name.clone().unwrap_or_default(),
            mac: d.mac.as_ref().map(ToString::to_string).unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    resolved: ResolvedProfile,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { network } => {
            let devices = match network {
                Some(network) => resolved.client.list_devices(&network).await?,
                None => {
                    let org = resolved.org_id.as_deref().ok_or_else(|| {
                        CliError::Validation {
                            field: "org-id".into(),
                            reason: "required when no --network is given".into(),
                        }
                    })?;
                    ControlPlane::list_org_devices(&resolved.client, org).await?
                }
            };

            let out = output::render_list(
                global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.serial.clone(),
            );
            println!("{out}");
            Ok(())
        }
    }
}
