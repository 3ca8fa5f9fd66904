// Registry of backend variants.
//
// Purpose
// - Turn a `Configuration` into an initialized store without the caller knowing
//   which storage technology is behind the backend type string.
//
// Responsibilities
// - Hold the explicit table backend type -> constructor.
// - Build and initialize single stores and batches of stores.
// - Keep failed stores observable: an init failure yields a degraded store that
//   still occupies its name.

use crate::shared::core::configuration::Configuration;
use crate::shared::infrastructure::event_store::degraded::DegradedEventStore;
use crate::shared::infrastructure::event_store::in_memory::{
    IN_MEMORY_BACKEND, InMemoryEventStore,
};
use crate::shared::infrastructure::event_store::{EventStore, EventStoreError, SharedEventStore};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub type BackendConstructor = fn() -> Box<dyn EventStore>;

pub type StoreMap = HashMap<String, SharedEventStore>;

fn in_memory_backend() -> Box<dyn EventStore> {
    Box::new(InMemoryEventStore::new())
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry: can't create eventstore {name}: unknown backend type {backend_type}")]
    UnknownBackendType { name: String, backend_type: String },

    #[error("registry: eventstore {name} failed to initialize: {source}")]
    Initialization {
        name: String,
        source: EventStoreError,
        store: Arc<DegradedEventStore>,
    },

    #[error("{}", join_lines(.0))]
    Batch(Vec<RegistryError>),
}

fn join_lines(errors: &[RegistryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl RegistryError {
    /// The instance left behind by a failed initialization, if any.
    pub fn into_store(self) -> Option<SharedEventStore> {
        match self {
            Self::Initialization { store, .. } => Some(store as SharedEventStore),
            _ => None,
        }
    }
}

/// Outcome of building many stores at once. `error` set means some stores
/// are degraded or missing, not that nothing started.
#[derive(Default)]
pub struct BatchCreation {
    pub stores: StoreMap,
    pub error: Option<RegistryError>,
}

pub struct Registry {
    backends: HashMap<String, BackendConstructor>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with the built-in backends.
    pub fn new() -> Self {
        Self::empty().with_backend(IN_MEMORY_BACKEND, in_memory_backend)
    }

    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    pub fn with_backend(
        mut self,
        backend_type: impl Into<String>,
        constructor: BackendConstructor,
    ) -> Self {
        self.backends.insert(backend_type.into(), constructor);
        self
    }

    pub fn backend_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub async fn create(
        &self,
        configuration: &Configuration,
    ) -> Result<SharedEventStore, RegistryError> {
        let name = configuration.name();
        let Some(constructor) = self.backends.get(configuration.backend_type()) else {
            return Err(RegistryError::UnknownBackendType {
                name: name.to_string(),
                backend_type: configuration.backend_type().to_string(),
            });
        };

        let mut store = constructor();
        if let Err(source) = store.init(&configuration.properties()).await {
            warn!(eventstore = name, error = %source, "registry: eventstore degraded");
            return Err(RegistryError::Initialization {
                name: name.to_string(),
                store: Arc::new(DegradedEventStore::new(name, source.to_string())),
                source,
            });
        }

        info!(
            eventstore = name,
            backend = configuration.backend_type(),
            "registry: eventstore initialized"
        );
        Ok(Arc::from(store))
    }

    pub async fn create_from_configuration(&self, configurations: &[Configuration]) -> BatchCreation {
        let mut stores = StoreMap::new();
        let mut errors = Vec::new();

        for configuration in configurations {
            let name = configuration.name().to_string();
            let store: SharedEventStore = match self.create(configuration).await {
                Ok(store) => store,
                Err(RegistryError::Initialization {
                    name,
                    source,
                    store,
                }) => {
                    errors.push(RegistryError::Initialization {
                        name,
                        source,
                        store: store.clone(),
                    });
                    store as SharedEventStore
                }
                Err(err) => {
                    warn!(error = %err, "registry: eventstore skipped");
                    errors.push(err);
                    continue;
                }
            };
            if stores.insert(name.clone(), store).is_some() {
                warn!(eventstore = %name, "registry: duplicate configuration, last one wins");
            }
        }

        BatchCreation {
            stores,
            error: (!errors.is_empty()).then_some(RegistryError::Batch(errors)),
        }
    }
}
