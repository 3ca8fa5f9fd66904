// In memory implementation of the entity store contract.
//
// Purpose
// - Serve `eventstore.inmemory` stores and back handler tests without a database.
//
// Responsibilities
// - Keep every version of every entity, indexed by version.
// - Enforce optimistic concurrency under the write lock so the check and the
//   append happen atomically.

use crate::shared::core::entity::{ConcurrencyMode, Entity, Version};
use crate::shared::infrastructure::event_store::{EventStore, EventStoreError, Metadata};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

pub const IN_MEMORY_BACKEND: &str = "eventstore.inmemory";

#[derive(Default)]
pub struct InMemoryEventStore {
    // Index in the Vec is the version.
    inner: RwLock<HashMap<String, Vec<Entity>>>,
    offline: bool,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    fn ready(&self) -> Result<(), EventStoreError> {
        if self.offline {
            return Err(EventStoreError::Backend("Event store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryEventStore {
    async fn init(&mut self, metadata: &Metadata) -> Result<(), EventStoreError> {
        debug!(properties = metadata.len(), "in-memory event store initialized");
        Ok(())
    }

    async fn add(&self, entity: Entity) -> Result<Entity, EventStoreError> {
        self.ready()?;
        let mut guard = self.inner.write().await;
        if guard.get(&entity.id).is_some_and(|versions| !versions.is_empty()) {
            return Err(EventStoreError::AlreadyExists { id: entity.id });
        }
        let stored = entity.with_version(0);
        guard.insert(stored.id.clone(), vec![stored.clone()]);
        Ok(stored)
    }

    async fn append(
        &self,
        entity: Entity,
        mode: ConcurrencyMode,
    ) -> Result<Entity, EventStoreError> {
        self.ready()?;
        let mut guard = self.inner.write().await;
        let Some(versions) = guard.get_mut(&entity.id).filter(|v| !v.is_empty()) else {
            return Err(EventStoreError::EntityNotFound { id: entity.id });
        };
        let latest = (versions.len() - 1) as Version;
        if let ConcurrencyMode::Optimistic { expected } = mode {
            if expected != latest {
                return Err(EventStoreError::VersionConflict {
                    id: entity.id,
                    expected,
                    actual: latest,
                });
            }
        }
        let stored = entity.with_version(latest + 1);
        versions.push(stored.clone());
        Ok(stored)
    }

    async fn get_by_version(&self, id: &str, version: Version) -> Result<Entity, EventStoreError> {
        self.ready()?;
        let guard = self.inner.read().await;
        usize::try_from(version)
            .ok()
            .and_then(|index| guard.get(id).and_then(|versions| versions.get(index)))
            .cloned()
            .ok_or_else(|| EventStoreError::VersionNotFound {
                id: id.to_string(),
                version,
            })
    }

    async fn get_by_version_range(
        &self,
        id: &str,
        start: Version,
        end: Version,
    ) -> Result<Vec<Entity>, EventStoreError> {
        self.ready()?;
        let guard = self.inner.read().await;
        let found: Vec<Entity> = guard
            .get(id)
            .map(|versions| {
                versions
                    .iter()
                    .filter(|e| e.version >= start && e.version <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if found.is_empty() {
            return Err(EventStoreError::RangeNotFound {
                id: id.to_string(),
                start,
                end,
            });
        }
        Ok(found)
    }

    async fn get_latest_version_number(&self, id: &str) -> Result<Version, EventStoreError> {
        self.ready()?;
        let guard = self.inner.read().await;
        match guard.get(id) {
            Some(versions) if !versions.is_empty() => Ok((versions.len() - 1) as Version),
            _ => Err(EventStoreError::EntityNotFound { id: id.to_string() }),
        }
    }
}
