use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    response::Response,
};
use tracing::info;

use crate::shared::core::configuration::Configuration;
use crate::shared::infrastructure::http::respond_with_error;
use crate::shell::state::ControlPlaneState;

const PUT_ERROR_CODE: &str = "ERR_PUT_EVENTSTORE";

/// Catalog listing, consumed by sidecars starting in kubernetes mode.
pub async fn list(State(state): State<ControlPlaneState>) -> impl IntoResponse {
    Json(state.catalog.list().await)
}

/// Stores the configuration and pushes it to every discovered sidecar.
pub async fn upsert(
    State(state): State<ControlPlaneState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let configuration: Configuration = match serde_json::from_slice(&body) {
        Ok(configuration) => configuration,
        Err(err) => {
            return respond_with_error(
                StatusCode::BAD_REQUEST,
                PUT_ERROR_CODE,
                format!("can't deserialize configuration: {err}"),
            );
        }
    };
    if configuration.name() != name {
        return respond_with_error(
            StatusCode::BAD_REQUEST,
            PUT_ERROR_CODE,
            format!(
                "configuration is for eventstore {}, sent to {name}",
                configuration.name()
            ),
        );
    }

    state.catalog.upsert(configuration.clone()).await;
    info!(eventstore = %name, "control plane: configuration stored");

    let addresses = match state.discovery.discover().await {
        Ok(addresses) => addresses,
        Err(err) => {
            return respond_with_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ERR_DISCOVER_SIDECARS",
                format!("can't discover sidecars: {err}"),
            );
        }
    };

    let report = state.publisher.publish(&addresses, &configuration).await;
    info!(
        eventstore = %name,
        sidecars = addresses.len(),
        succeeded = report.succeeded(),
        "control plane: configuration propagated"
    );
    Json(report).into_response()
}
