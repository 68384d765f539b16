//! `status`: firmware identity and support check.

use serde::Serialize;

use fortitrack_api::MINIMUM_SUPPORTED_VERSION;
use fortitrack_core::{FirewallConfig, FortiOsSource};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusView {
    url: String,
    vdom: String,
    hostname: Option<String>,
    model: Option<String>,
    serial: String,
    version: String,
    build: Option<u64>,
    supported: bool,
    minimum_version: String,
}

fn detail(s: &StatusView) -> String {
    let dash = || "-".to_owned();
    [
        format!("URL:       {}", s.url),
        format!("VDOM:      {}", s.vdom),
        format!("Hostname:  {}", s.hostname.clone().unwrap_or_else(dash)),
        format!("Model:     {}", s.model.clone().unwrap_or_else(dash)),
        format!("Serial:    {}", s.serial),
        format!(
            "Firmware:  {}{}",
            s.version,
            s.build.map_or_else(String::new, |b| format!(" (build {b})"))
        ),
        format!(
            "Supported: {}",
            if s.supported {
                "yes".to_owned()
            } else {
                format!("no (requires {})", s.minimum_version)
            }
        ),
    ]
    .join("\n")
}

pub async fn handle(firewall: &FirewallConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let source = FortiOsSource::from_config(firewall)?;
    let client = source.client();
    let status = client.system_status().await?;
    let check = status.check_supported();

    let view = StatusView {
        url: client.base_url().to_string(),
        vdom: client.vdom().to_owned(),
        hostname: status.hostname.clone(),
        model: status.model.clone(),
        serial: status.serial.clone(),
        version: status.version.clone(),
        build: status.build,
        supported: check.is_ok(),
        minimum_version: MINIMUM_SUPPORTED_VERSION.to_string(),
    };
    let out = output::render_single(global.output, &view, detail, |s| s.version.clone())?;
    output::print_output(&out, global.quiet);

    check?;
    Ok(())
}
