//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;

use nacly_core::store::seed;
use nacly_core::{Device, ImportReport, JsonStore};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            mac: d.mac.to_string(),
            username: d.username.clone().unwrap_or_else(|| "-".into()),
            access: output::access_label(d.state(), color),
            vlan: or_dash(d.vlan),
        }
    }
}

fn detail(d: &Device) -> String {
    [
        format!("MAC:        {}", d.mac),
        format!("Username:   {}", d.username.as_deref().unwrap_or("-")),
        format!("Authorized: {}", d.authorized),
        format!("VLAN:       {}", or_dash(d.vlan)),
    ]
    .join("\n")
}

/// Import outcome including entries the parser had to drop.
#[derive(Debug, Serialize)]
struct DeviceImportSummary {
    #[serde(flatten)]
    report: ImportReport,
    rejected: usize,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &JsonStore, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { authorized } => {
            let devices = if authorized {
                store.list_authorized_devices()?
            } else {
                store.list_devices()?
            };
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.mac.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Register {
            mac,
            username,
            vlan,
            blocked,
        } => {
            let mac = util::parse_mac(&mac)?;
            let vlan = vlan.map(util::parse_vlan).transpose()?;
            let device = Device::new(mac, username, !blocked, vlan);
            let created = store.register_device(device.clone())?;

            let out =
                output::render_single(&global.output, &device, detail, |d| d.mac.to_string())?;
            output::print_output(&out, global.quiet);
            let verb = if created { "registered" } else { "updated" };
            output::print_status(&format!("Device {mac} {verb}"), global.quiet);
            Ok(())
        }

        DevicesCommand::Remove { mac } => {
            let mac = util::parse_mac(&mac)?;
            if !util::confirm(&format!("Remove device {mac}?"), global.yes)? {
                return Ok(());
            }
            if !store.remove_device(&mac)? {
                return Err(CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: mac.to_string(),
                    list_command: "devices list".into(),
                });
            }
            output::print_status(&format!("Device {mac} removed"), global.quiet);
            Ok(())
        }

        DevicesCommand::Import { file } => {
            let contents = util::read_text_file(&file)?;
            let parsed = seed::parse_device_seed(&contents)?;
            let report = store.import_devices(parsed.devices)?;
            let summary = DeviceImportSummary {
                report,
                rejected: parsed.rejected,
            };

            let out = output::render_single(
                &global.output,
                &summary,
                |s| {
                    format!(
                        "Inserted: {}\nSkipped:  {}\nRejected: {}",
                        s.report.inserted, s.report.skipped, s.rejected
                    )
                },
                |s| s.report.inserted.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
