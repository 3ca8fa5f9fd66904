use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    response::Response,
};

use crate::shared::core::entity::Entity;
use crate::shared::infrastructure::event_store::EventStoreError;
use crate::shared::infrastructure::http::respond_with_error;
use crate::shell::state::AppState;

const ERROR_CODE: &str = "ERR_INVOKE_POST_ENTITY";

pub async fn handle(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let Some(store) = state.store(&name) else {
        return respond_with_error(
            StatusCode::NOT_FOUND,
            ERROR_CODE,
            format!("eventstore {name} not found"),
        );
    };

    // Content-Type is not checked; any body that parses as an entity is accepted.
    let mut entity: Entity = match serde_json::from_slice(&body) {
        Ok(entity) => entity,
        Err(err) => {
            return respond_with_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ERROR_CODE,
                format!("can't deserialize request: {err}"),
            );
        }
    };
    entity.id = id;

    match store.add(entity).await {
        Ok(stored) => {
            let location = format!("/eventstores/{name}/entities/{}", stored.id);
            let etag = format!("\"{}\"", stored.version);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location), (header::ETAG, etag)],
                Json(stored),
            )
                .into_response()
        }
        Err(err @ EventStoreError::AlreadyExists { .. }) => respond_with_error(
            StatusCode::CONFLICT,
            ERROR_CODE,
            format!("can't add entity to eventstore: {err}"),
        ),
        Err(err) => respond_with_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ERROR_CODE,
            format!("can't add entity to eventstore: {err}"),
        ),
    }
}
