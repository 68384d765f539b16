//! Shared helpers for command handlers.

use std::sync::Arc;

use fortitrack_core::{
    DeviceRegistryReconciler, FirewallConfig, FortiOsSource, Notifier, RefreshError,
    RefreshOutcome,
};

use crate::error::CliError;

/// Reconciler wired to the firewall's device inventory.
pub fn reconciler(
    firewall: &FirewallConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<Arc<DeviceRegistryReconciler>, CliError> {
    let source = FortiOsSource::from_config(firewall)?;
    Ok(Arc::new(DeviceRegistryReconciler::new(
        Arc::new(source),
        notifier,
        firewall.reconciler.clone(),
    )))
}

/// Run exactly one refresh, turning a failed cycle into a `CliError`.
pub async fn refresh_once(
    reconciler: &DeviceRegistryReconciler,
    firewall: &FirewallConfig,
) -> Result<RefreshOutcome, CliError> {
    let outcome = reconciler.refresh().await;
    match &outcome.error {
        None => {
            for err in &outcome.decode_errors {
                tracing::warn!(error = %err, "skipped device record");
            }
            Ok(outcome)
        }
        Some(RefreshError::Fetch(e)) => {
            Err(CliError::from_fetch(e.clone(), firewall.url.as_str()))
        }
        Some(RefreshError::Cancelled) => Err(CliError::ApiError {
            message: "refresh cancelled".into(),
        }),
    }
}

/// A notifier that drops every event, for one-shot commands.
pub fn silent() -> Arc<dyn Notifier> {
    Arc::new(|_: &fortitrack_core::RegistryEvent| {})
}
