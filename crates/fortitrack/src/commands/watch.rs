//! `watch`: poll until Ctrl-C and print one line per registry event.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use fortitrack_core::{
    BroadcastNotifier, DeviceRegistryReconciler, FirewallConfig, Poller, RegistryEvent,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct EventLine<'a> {
    at: DateTime<Utc>,
    signal: String,
    #[serde(flatten)]
    event: &'a RegistryEvent,
}

pub async fn handle(
    args: WatchArgs,
    firewall: &FirewallConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let period = match args.interval {
        Some(0) => {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Some(secs) => Duration::from_secs(secs),
        None => firewall.scan_interval,
    };

    let notifier = BroadcastNotifier::new();
    let mut rx = notifier.subscribe();
    let reconciler = util::reconciler(firewall, Arc::new(notifier.clone()))?;

    // Fail fast on bad credentials or an unreachable firewall.
    util::refresh_once(&reconciler, firewall).await?;

    let poller = Poller::spawn(Arc::clone(&reconciler), period);
    let namespace = firewall.signal_namespace();
    let color = output::should_color(global.color);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Ok(event) => {
                    let line = render_event(&event, &namespace, &reconciler, global.output, color)?;
                    output::print_output(&line, global.quiet);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event output fell behind; some events were dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    poller.shutdown().await;
    Ok(())
}

fn render_event(
    event: &RegistryEvent,
    namespace: &str,
    reconciler: &DeviceRegistryReconciler,
    format: OutputFormat,
    color: bool,
) -> Result<String, CliError> {
    let line = EventLine {
        at: Utc::now(),
        signal: event.signal(namespace),
        event,
    };
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(&line, true),
        OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(&line)?)),
        OutputFormat::Plain => Ok(format!(
            "{} {}",
            line.signal,
            event
                .ids()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        )),
        OutputFormat::Table => Ok(human_line(event, reconciler, &line.at, color)),
    }
}

fn human_line(
    event: &RegistryEvent,
    reconciler: &DeviceRegistryReconciler,
    at: &DateTime<Utc>,
    color: bool,
) -> String {
    let stamp = at.format("%H:%M:%S");
    match event {
        RegistryEvent::NewDeviceDiscovered { ids } => {
            let names: Vec<String> = ids
                .iter()
                .map(|id| match reconciler.get(id) {
                    Some(d) if d.hostname().is_some() => format!("{id} ({})", d.display_name()),
                    _ => id.to_string(),
                })
                .collect();
            let tag = if color {
                "new".green().bold().to_string()
            } else {
                "new".into()
            };
            format!("{stamp} {tag}     {}", names.join(", "))
        }
        RegistryEvent::DeviceListUpdated { ids, evicted } => {
            let online = ids
                .iter()
                .filter(|id| reconciler.get(id).is_some_and(|d| d.is_online))
                .count();
            let mut line = format!("{stamp} update  {} reported, {online} online", ids.len());
            if !evicted.is_empty() {
                line.push_str(&format!(", {} removed", evicted.len()));
            }
            line
        }
    }
}
