// Applies a configuration pushed by the control plane.
//
// Per named store:
// - name not served here: nothing changes, the push is acknowledged.
// - name served here and the new store builds: the entry is swapped; requests
//   already holding the old store finish against it.
// - name served here and the build fails: the old store keeps serving.

use crate::modules::eventstores::live_stores::LiveStores;
use crate::modules::eventstores::registry::{Registry, RegistryError};
use crate::shared::core::configuration::Configuration;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Ignored,
    Replaced,
}

#[derive(Debug, Error)]
pub enum PushConfigurationError {
    #[error("configuration is for eventstore {actual}, pushed to {expected}")]
    NameMismatch { expected: String, actual: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub struct PushConfigurationHandler {
    registry: Arc<Registry>,
    stores: Arc<LiveStores>,
}

impl PushConfigurationHandler {
    pub fn new(registry: Arc<Registry>, stores: Arc<LiveStores>) -> Self {
        Self { registry, stores }
    }

    pub fn serves(&self, name: &str) -> bool {
        self.stores.contains(name)
    }

    pub async fn handle(
        &self,
        name: &str,
        configuration: Configuration,
    ) -> Result<PushOutcome, PushConfigurationError> {
        if !self.serves(name) {
            debug!(eventstore = name, "api: configuration ignored, not served here");
            return Ok(PushOutcome::Ignored);
        }
        if configuration.name() != name {
            return Err(PushConfigurationError::NameMismatch {
                expected: name.to_string(),
                actual: configuration.name().to_string(),
            });
        }

        let store = self.registry.create(&configuration).await.inspect_err(|err| {
            warn!(eventstore = name, error = %err, "api: failed to update store from configuration");
        })?;

        if self.stores.replace(name, store) {
            info!(
                eventstore = name,
                backend = configuration.backend_type(),
                "api: configuration for eventstore updated"
            );
            Ok(PushOutcome::Replaced)
        } else {
            Ok(PushOutcome::Ignored)
        }
    }
}

#[cfg(test)]
mod push_configuration_handler_tests {
    use super::*;
    use crate::modules::eventstores::registry::StoreMap;
    use crate::shared::core::entity::Entity;
    use crate::shared::infrastructure::event_store::in_memory::{
        IN_MEMORY_BACKEND, InMemoryEventStore,
    };
    use crate::shared::infrastructure::event_store::{EventStore, SharedEventStore};
    use rstest::{fixture, rstest};
    use serde_json::json;

    type BeforeEachReturn = (PushConfigurationHandler, Arc<LiveStores>, SharedEventStore);

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let old: SharedEventStore = Arc::new(InMemoryEventStore::new());
        let stores = Arc::new(LiveStores::new(StoreMap::from([(
            "orders".to_string(),
            old.clone(),
        )])));
        let handler = PushConfigurationHandler::new(Arc::new(Registry::new()), stores.clone());
        (handler, stores, old)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_swap_in_a_fresh_store(before_each: BeforeEachReturn) {
        let (handler, stores, old) = before_each;
        old.add(Entity::new("a", json!(1))).await.unwrap();

        let outcome = handler
            .handle("orders", Configuration::new("orders", IN_MEMORY_BACKEND))
            .await
            .unwrap();

        assert_eq!(outcome, PushOutcome::Replaced);
        let current = stores.get("orders").unwrap();
        assert!(!Arc::ptr_eq(&current, &old));
        assert!(current.get_latest_version_number("a").await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_ignore_a_name_it_does_not_serve(before_each: BeforeEachReturn) {
        let (handler, stores, _) = before_each;
        let before = stores.snapshot();

        let outcome = handler
            .handle("payments", Configuration::new("payments", IN_MEMORY_BACKEND))
            .await
            .unwrap();

        assert_eq!(outcome, PushOutcome::Ignored);
        assert!(Arc::ptr_eq(&before, &stores.snapshot()));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_old_store_when_the_build_fails(before_each: BeforeEachReturn) {
        let (handler, stores, old) = before_each;

        let result = handler
            .handle("orders", Configuration::new("orders", "eventstore.nope"))
            .await;

        assert!(matches!(
            result,
            Err(PushConfigurationError::Registry(
                RegistryError::UnknownBackendType { .. }
            ))
        ));
        assert!(Arc::ptr_eq(&stores.get("orders").unwrap(), &old));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_configuration_for_another_name(before_each: BeforeEachReturn) {
        let (handler, stores, old) = before_each;

        let result = handler
            .handle("orders", Configuration::new("invoices", IN_MEMORY_BACKEND))
            .await;

        assert!(matches!(
            result,
            Err(PushConfigurationError::NameMismatch { .. })
        ));
        assert!(Arc::ptr_eq(&stores.get("orders").unwrap(), &old));
        assert!(!stores.contains("invoices"));
    }
}
