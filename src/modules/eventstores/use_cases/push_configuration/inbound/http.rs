use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    response::Response,
};
use tracing::warn;

use crate::modules::eventstores::use_cases::push_configuration::handler::{
    PushConfigurationError, PushConfigurationHandler,
};
use crate::shared::core::configuration::Configuration;
use crate::shared::infrastructure::http::respond_with_error;
use crate::shell::state::AppState;

const ERROR_CODE: &str = "ERR_INVOKE_POST_CONFIGURATION";

/// Answers 200 when the store is swapped or not served here, 400 when the
/// body names another store, and 500 when the body can't be read or the new
/// store can't be built. In every failure the old store keeps serving.
pub async fn handle(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let handler = PushConfigurationHandler::new(state.registry.clone(), state.stores.clone());

    // The control plane broadcasts to every sidecar; foreign names are not errors.
    if !handler.serves(&name) {
        return StatusCode::OK.into_response();
    }

    let configuration: Configuration = match serde_json::from_slice(&body) {
        Ok(configuration) => configuration,
        Err(err) => {
            warn!(eventstore = %name, error = %err, "api: configuration can't be deserialized");
            return respond_with_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ERROR_CODE,
                format!("can't deserialize configuration: {err}"),
            );
        }
    };

    match handler.handle(&name, configuration).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err @ PushConfigurationError::NameMismatch { .. }) => {
            respond_with_error(StatusCode::BAD_REQUEST, ERROR_CODE, err.to_string())
        }
        Err(err) => respond_with_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ERROR_CODE,
            format!("failed to update store from configuration: {err}"),
        ),
    }
}

#[cfg(test)]
mod push_configuration_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::modules::eventstores::registry::{Registry, StoreMap};
    use crate::shared::core::entity::Entity;
    use crate::shared::infrastructure::event_store::degraded::DegradedEventStore;
    use crate::shared::infrastructure::event_store::in_memory::InMemoryEventStore;
    use crate::shared::infrastructure::event_store::{EventStore, SharedEventStore};
    use crate::shell::state::AppState;

    use super::handle;

    const VALID: &str = r#"{"kind":"eventstore","metadata":{"name":"orders"},"spec":{"type":"eventstore.inmemory","metadata":[]}}"#;

    const BROKEN_BACKEND: &str = "eventstore.broken";

    // A backend whose init always fails.
    fn broken_backend() -> Box<dyn EventStore> {
        Box::new(DegradedEventStore::new("orders", "connection refused"))
    }

    fn make_test_state() -> (AppState, SharedEventStore) {
        let store: SharedEventStore = Arc::new(InMemoryEventStore::new());
        let state = AppState::new(
            Registry::new().with_backend(BROKEN_BACKEND, broken_backend),
            StoreMap::from([("orders".to_string(), store.clone())]),
        );
        (state, store)
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/configurations/{name}", post(handle))
            .with_state(state)
    }

    fn push(name: &str, body: &'static str) -> Request<Body> {
        Request::post(format!("/configurations/{name}"))
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn it_should_return_200_and_swap_the_store() {
        let (state, old) = make_test_state();

        let response = app(state.clone()).oneshot(push("orders", VALID)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!Arc::ptr_eq(&state.store("orders").unwrap(), &old));
    }

    #[tokio::test]
    async fn it_should_return_200_for_a_foreign_name_even_with_a_bad_body() {
        let (state, _) = make_test_state();

        let response = app(state.clone())
            .oneshot(push("payments", "garbage"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.stores.names(), vec!["orders"]);
    }

    #[tokio::test]
    async fn it_should_return_500_on_an_undeserializable_configuration() {
        let (state, old) = make_test_state();

        let response = app(state.clone())
            .oneshot(push("orders", r#"{"kind":"eventstore"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(Arc::ptr_eq(&state.store("orders").unwrap(), &old));
    }

    #[tokio::test]
    async fn it_should_return_500_and_keep_the_old_store_on_an_unknown_backend() {
        let (state, old) = make_test_state();

        let response = app(state.clone())
            .oneshot(push(
                "orders",
                r#"{"kind":"eventstore","metadata":{"name":"orders"},"spec":{"type":"eventstore.nope"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(Arc::ptr_eq(&state.store("orders").unwrap(), &old));
    }

    #[tokio::test]
    async fn it_should_return_400_when_the_body_names_another_store() {
        let (state, _) = make_test_state();

        let response = app(state)
            .oneshot(push(
                "orders",
                r#"{"metadata":{"name":"invoices"},"spec":{"type":"eventstore.inmemory"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_should_accept_a_configuration_sent_as_plain_text() {
        let (state, old) = make_test_state();

        let response = app(state.clone())
            .oneshot(
                Request::post("/configurations/orders")
                    .header("content-type", "text/plain")
                    .body(Body::from(VALID))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!Arc::ptr_eq(&state.store("orders").unwrap(), &old));
    }

    #[tokio::test]
    async fn it_should_return_500_and_keep_the_old_store_when_init_fails() {
        let (state, old) = make_test_state();
        old.add(Entity::new("a", serde_json::json!(1))).await.unwrap();

        let response = app(state.clone())
            .oneshot(push(
                "orders",
                r#"{"metadata":{"name":"orders"},"spec":{"type":"eventstore.broken"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["errorCode"], "ERR_INVOKE_POST_CONFIGURATION");
        assert!(
            json["errorMessage"]
                .as_str()
                .unwrap()
                .contains("failed to initialize")
        );
        let current = state.store("orders").unwrap();
        assert!(Arc::ptr_eq(&current, &old));
        assert_eq!(current.get_latest_version_number("a").await.unwrap(), 0);
    }
}
