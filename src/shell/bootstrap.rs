// Builds the sidecar's initial live stores.
//
// Standalone: a missing or broken file is logged and the sidecar starts empty.
// Kubernetes: the operator is the only source, so failing to reach it or to
// find any served store there is fatal and the pod restarts. Served names the
// operator has no configuration for are held by degraded stores, so a later
// push can still replace them.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::modules::configuration_sources::{kubernetes, standalone};
use crate::modules::eventstores::registry::Registry;
use crate::shared::core::configuration::Configuration;
use crate::shared::infrastructure::event_store::degraded::DegradedEventStore;
use crate::shell::settings::{Mode, SidecarArgs};
use crate::shell::state::AppState;

const OPERATOR_TIMEOUT: Duration = Duration::from_secs(10);

async fn standalone_configurations(args: &SidecarArgs) -> Vec<Configuration> {
    let Some(path) = &args.config else {
        return Vec::new();
    };
    match standalone::load(path).await {
        Ok(configurations) => configurations,
        Err(err) => {
            warn!(error = %err, "sidecar: starting without eventstores");
            Vec::new()
        }
    }
}

async fn operator_configurations(
    args: &SidecarArgs,
    served: &[String],
) -> anyhow::Result<Vec<Configuration>> {
    let endpoint = args
        .operator_endpoint
        .as_deref()
        .context("an operator endpoint is required in kubernetes mode")?;
    let configurations = kubernetes::OperatorClient::new(endpoint, OPERATOR_TIMEOUT)?
        .load(served)
        .await
        .context("loading eventstore configurations from the operator")?;
    Ok(configurations)
}

pub async fn sidecar_state(args: &SidecarArgs) -> anyhow::Result<AppState> {
    let (configurations, served) = match args.mode {
        Mode::Standalone => (standalone_configurations(args).await, Vec::new()),
        Mode::Kubernetes => {
            let served =
                kubernetes::parse_eventstore_names(args.eventstores.as_deref().unwrap_or(""))?;
            (operator_configurations(args, &served).await?, served)
        }
    };

    let registry = Registry::new();
    let mut created = registry.create_from_configuration(&configurations).await;
    if let Some(err) = &created.error {
        warn!(error = %err, "sidecar: some eventstores failed to initialize");
    }
    for name in served {
        if !created.stores.contains_key(&name) {
            warn!(eventstore = %name, "sidecar: no usable configuration, degraded until pushed");
            created.stores.insert(
                name.clone(),
                Arc::new(DegradedEventStore::new(
                    &name,
                    "no usable configuration received from the operator",
                )),
            );
        }
    }

    let state = AppState::new(registry, created.stores);
    info!(eventstores = ?state.stores.names(), mode = ?args.mode, "sidecar: stores ready");
    Ok(state)
}
