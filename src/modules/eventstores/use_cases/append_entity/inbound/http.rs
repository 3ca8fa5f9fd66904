use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    response::Response,
};

use crate::shared::core::entity::{ConcurrencyMode, Entity};
use crate::shared::infrastructure::event_store::EventStoreError;
use crate::shared::infrastructure::http::respond_with_error;
use crate::shell::state::AppState;

const ERROR_CODE: &str = "ERR_INVOKE_PUT_ENTITY";

/// `If-Match` switches the append to optimistic mode. Accepts `3` or `"3"`.
pub fn concurrency_mode(headers: &HeaderMap) -> Result<ConcurrencyMode, String> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(ConcurrencyMode::None);
    };
    let raw = value
        .to_str()
        .map_err(|err| format!("can't read If-Match header: {err}"))?;
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted
        .parse()
        .map(|expected| ConcurrencyMode::Optimistic { expected })
        .map_err(|err| format!("can't convert If-Match to a version number: {err}"))
}

pub async fn handle(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(store) = state.store(&name) else {
        return respond_with_error(
            StatusCode::NOT_FOUND,
            ERROR_CODE,
            format!("eventstore {name} not found"),
        );
    };

    let mode = match concurrency_mode(&headers) {
        Ok(mode) => mode,
        Err(message) => return respond_with_error(StatusCode::BAD_REQUEST, ERROR_CODE, message),
    };

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

    match store.append(entity, mode).await {
        Ok(stored) => {
            let etag = format!("\"{}\"", stored.version);
            (StatusCode::OK, [(header::ETAG, etag)], Json(stored)).into_response()
        }
        Err(err) => {
            let status = match err {
                EventStoreError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
                EventStoreError::VersionConflict { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            respond_with_error(
                status,
                ERROR_CODE,
                format!("can't append entity to eventstore: {err}"),
            )
        }
    }
}

#[cfg(test)]
mod append_entity_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{HeaderMap, HeaderValue, Request, StatusCode, header},
        routing::put,
    };
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::modules::eventstores::registry::{Registry, StoreMap};
    use crate::shared::core::entity::{ConcurrencyMode, Entity};
    use crate::shared::infrastructure::event_store::in_memory::InMemoryEventStore;
    use crate::shared::infrastructure::event_store::{EventStore, SharedEventStore};
    use crate::shell::state::AppState;

    use super::{concurrency_mode, handle};

    async fn make_test_state() -> AppState {
        let store = InMemoryEventStore::new();
        store.add(Entity::new("a", json!({ "x": 1 }))).await.unwrap();
        let store: SharedEventStore = Arc::new(store);
        AppState::new(Registry::new(), StoreMap::from([("orders".to_string(), store)]))
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/eventstores/{name}/entities/{id}", put(handle))
            .with_state(state)
    }

    fn put_entity(uri: &str, if_match: Option<&str>, body: &'static str) -> Request<Body> {
        let mut builder = Request::put(uri).header("content-type", "application/json");
        if let Some(v) = if_match {
            builder = builder.header("if-match", v);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[rstest]
    #[case::absent(None, ConcurrencyMode::None)]
    #[case::bare(Some("3"), ConcurrencyMode::Optimistic { expected: 3 })]
    #[case::quoted(Some("\"3\""), ConcurrencyMode::Optimistic { expected: 3 })]
    #[case::padded(Some(" 0 "), ConcurrencyMode::Optimistic { expected: 0 })]
    fn it_should_read_the_concurrency_mode_from_if_match(
        #[case] value: Option<&'static str>,
        #[case] expected: ConcurrencyMode,
    ) {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(header::IF_MATCH, HeaderValue::from_static(v));
        }

        assert_eq!(concurrency_mode(&headers), Ok(expected));
    }

    #[rstest]
    #[case::text("abc")]
    #[case::negative("-1")]
    #[case::wildcard("*")]
    fn it_should_reject_a_malformed_if_match(#[case] value: &'static str) {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_MATCH, HeaderValue::from_static(value));

        assert!(concurrency_mode(&headers).is_err());
    }

    #[tokio::test]
    async fn it_should_return_200_with_the_next_version() {
        let response = app(make_test_state().await)
            .oneshot(put_entity(
                "/eventstores/orders/entities/a",
                None,
                r#"{"data":{"x":2}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ETAG], "\"1\"");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, json!({ "id": "a", "version": 1, "data": { "x": 2 } }));
    }

    #[tokio::test]
    async fn it_should_return_409_on_a_stale_if_match() {
        let app = app(make_test_state().await);
        let first = app
            .clone()
            .oneshot(put_entity(
                "/eventstores/orders/entities/a",
                Some("0"),
                r#"{"data":{"x":2}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let stale = app
            .oneshot(put_entity(
                "/eventstores/orders/entities/a",
                Some("0"),
                r#"{"data":{"x":3}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(stale.status(), StatusCode::CONFLICT);
        let bytes = stale.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["errorCode"], "ERR_INVOKE_PUT_ENTITY");
    }

    #[tokio::test]
    async fn it_should_return_400_on_a_malformed_if_match() {
        let response = app(make_test_state().await)
            .oneshot(put_entity(
                "/eventstores/orders/entities/a",
                Some("zero"),
                r#"{"data":{"x":2}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_should_return_404_for_an_unknown_entity() {
        let response = app(make_test_state().await)
            .oneshot(put_entity(
                "/eventstores/orders/entities/b",
                None,
                r#"{"data":{"x":2}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn it_should_return_404_for_an_unknown_store() {
        let response = app(make_test_state().await)
            .oneshot(put_entity(
                "/eventstores/nope/entities/a",
                None,
                r#"{"data":{"x":2}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn it_should_accept_a_json_body_sent_as_plain_text() {
        let response = app(make_test_state().await)
            .oneshot(
                Request::put("/eventstores/orders/entities/a")
                    .header("content-type", "text/plain")
                    .header("if-match", "0")
                    .body(Body::from(r#"{"data":{"x":2}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ETAG], "\"1\"");
    }

    #[tokio::test]
    async fn it_should_return_500_on_invalid_json() {
        let response = app(make_test_state().await)
            .oneshot(put_entity("/eventstores/orders/entities/a", None, "{"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
