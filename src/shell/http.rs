use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::modules::control_plane::inbound::http as control_plane_http;
use crate::modules::eventstores::use_cases::add_entity::inbound::http as add_http;
use crate::modules::eventstores::use_cases::append_entity::inbound::http as append_http;
use crate::modules::eventstores::use_cases::get_entity::inbound::http as get_http;
use crate::modules::eventstores::use_cases::list_eventstores::inbound::http as list_http;
use crate::modules::eventstores::use_cases::push_configuration::inbound::http as push_http;
use crate::shell::state::{AppState, ControlPlaneState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/eventstores", get(list_http::handle))
        .route(
            "/eventstores/{name}/entities/{id}",
            post(add_http::handle)
                .put(append_http::handle)
                .get(get_http::handle),
        )
        .route("/configurations/{name}", post(push_http::handle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn control_plane_router(state: ControlPlaneState) -> Router {
    Router::new()
        .route("/eventstores", get(control_plane_http::list))
        .route("/eventstores/{name}", axum::routing::put(control_plane_http::upsert))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
