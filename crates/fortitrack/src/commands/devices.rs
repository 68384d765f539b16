//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use fortitrack_core::{Device, FirewallConfig};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "OS")]
    os: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            mac: d.id.to_string(),
            name: d.hostname().unwrap_or_default().to_owned(),
            ip: d.ipv4().unwrap_or_default().to_owned(),
            vendor: d.hardware_vendor().unwrap_or_default().to_owned(),
            os: d.os_name().unwrap_or_default().to_owned(),
            state: output::presence(d.is_online, color),
            last_seen: d
                .last_seen
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

fn detail(d: &Arc<Device>) -> String {
    let mut lines = vec![
        format!("MAC:       {}", d.id),
        format!("Name:      {}", d.display_name()),
        format!("State:     {}", output::presence(d.is_online, false)),
        format!(
            "Last seen: {}",
            d.last_seen.map_or_else(|| "-".into(), |t| t.to_rfc3339())
        ),
    ];
    for (key, value) in &d.attributes {
        lines.push(format!("  {key}: {value}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: DevicesArgs,
    firewall: &FirewallConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reconciler = util::reconciler(firewall, util::silent())?;
    util::refresh_once(&reconciler, firewall).await?;
    let color = output::should_color(global.color);

    match args.command {
        DevicesCommand::List { online } => {
            let devices: Vec<Arc<Device>> = reconciler
                .all()
                .into_iter()
                .filter(|d| !online || d.is_online)
                .collect();
            let out = output::render_list(
                global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { mac } => {
            let Some(device) = reconciler.get_str(&mac) else {
                return Err(CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: mac,
                    list_command: "devices list".into(),
                });
            };
            let out =
                output::render_single(global.output, &device, detail, |d| d.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
