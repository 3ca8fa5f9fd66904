// Stands in for a store whose initialization failed.
//
// It keeps the name occupied so the failure stays visible per request instead
// of the store vanishing from the live directory.

use crate::shared::core::entity::{ConcurrencyMode, Entity, Version};
use crate::shared::infrastructure::event_store::{EventStore, EventStoreError, Metadata};

#[derive(Debug, Clone)]
pub struct DegradedEventStore {
    name: String,
    reason: String,
}

impl DegradedEventStore {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    fn unavailable(&self) -> EventStoreError {
        EventStoreError::Unavailable(format!(
            "eventstore {} is degraded: {}",
            self.name, self.reason
        ))
    }
}

#[async_trait::async_trait]
impl EventStore for DegradedEventStore {
    async fn init(&mut self, _metadata: &Metadata) -> Result<(), EventStoreError> {
        Err(self.unavailable())
    }

    async fn add(&self, _entity: Entity) -> Result<Entity, EventStoreError> {
        Err(self.unavailable())
    }

    async fn append(
        &self,
        _entity: Entity,
        _mode: ConcurrencyMode,
    ) -> Result<Entity, EventStoreError> {
        Err(self.unavailable())
    }

    async fn get_by_version(&self, _id: &str, _version: Version) -> Result<Entity, EventStoreError> {
        Err(self.unavailable())
    }

    async fn get_by_version_range(
        &self,
        _id: &str,
        _start: Version,
        _end: Version,
    ) -> Result<Vec<Entity>, EventStoreError> {
        Err(self.unavailable())
    }

    async fn get_latest_version_number(&self, _id: &str) -> Result<Version, EventStoreError> {
        Err(self.unavailable())
    }
}
