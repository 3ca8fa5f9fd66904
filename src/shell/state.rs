use crate::modules::control_plane::catalog::ConfigurationCatalog;
use crate::modules::control_plane::discovery::EndpointDiscovery;
use crate::modules::control_plane::publisher::ConfigurationPublisher;
use crate::modules::eventstores::live_stores::LiveStores;
use crate::modules::eventstores::registry::{Registry, StoreMap};
use crate::shared::infrastructure::event_store::SharedEventStore;
use std::sync::Arc;

/// State of a sidecar: the backend table and the live name -> store directory.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub stores: Arc<LiveStores>,
}

impl AppState {
    pub fn new(registry: Registry, stores: StoreMap) -> Self {
        Self {
            registry: Arc::new(registry),
            stores: Arc::new(LiveStores::new(stores)),
        }
    }

    pub fn store(&self, name: &str) -> Option<SharedEventStore> {
        self.stores.get(name)
    }
}

/// State of the control plane.
#[derive(Clone)]
pub struct ControlPlaneState {
    pub catalog: Arc<ConfigurationCatalog>,
    pub discovery: Arc<dyn EndpointDiscovery>,
    pub publisher: Arc<ConfigurationPublisher>,
}
