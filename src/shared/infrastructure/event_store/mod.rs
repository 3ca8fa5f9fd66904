// Entity store contract shared by every backend.
//
// Purpose
// - Describe the versioned append-only store as a trait so the registry and the
//   HTTP layer never depend on a concrete storage technology.
//
// Responsibilities
// - Versions per id are contiguous and start at 0. Nothing is rewritten.
// - Writes to the same id are linearizable. Reads and writes to other ids may
//   run in parallel.
// - Errors the HTTP layer maps to specific statuses are typed variants; the rest
//   degrade to `Backend`.

use crate::shared::core::entity::{ConcurrencyMode, Entity, Version};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod degraded;
pub mod in_memory;

/// Flattened backend properties (credentials, table names, ...).
pub type Metadata = HashMap<String, String>;

pub type SharedEventStore = Arc<dyn EventStore>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventStoreError {
    #[error("entity {id} not found")]
    EntityNotFound { id: String },

    #[error("entity {id} has no version {version}")]
    VersionNotFound { id: String, version: Version },

    #[error("entity {id} has no versions between {start} and {end}")]
    RangeNotFound {
        id: String,
        start: Version,
        end: Version,
    },

    #[error("entity {id} already exists")]
    AlreadyExists { id: String },

    #[error("version conflict on entity {id}: expected {expected}, actual {actual}")]
    VersionConflict {
        id: String,
        expected: Version,
        actual: Version,
    },

    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl EventStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EntityNotFound { .. } | Self::VersionNotFound { .. } | Self::RangeNotFound { .. }
        )
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// One-time setup, called once before the store is shared.
    async fn init(&mut self, metadata: &Metadata) -> Result<(), EventStoreError>;

    /// Stores version 0 of a new id. The version on `entity` is ignored.
    async fn add(&self, entity: Entity) -> Result<Entity, EventStoreError>;

    /// Stores the next version of an existing id.
    async fn append(
        &self,
        entity: Entity,
        mode: ConcurrencyMode,
    ) -> Result<Entity, EventStoreError>;

    async fn get_by_version(&self, id: &str, version: Version) -> Result<Entity, EventStoreError>;

    /// Versions in `start..=end` ascending. Gaps are skipped; an empty result
    /// is `RangeNotFound`.
    async fn get_by_version_range(
        &self,
        id: &str,
        start: Version,
        end: Version,
    ) -> Result<Vec<Entity>, EventStoreError>;

    async fn get_latest_version_number(&self, id: &str) -> Result<Version, EventStoreError>;
}
