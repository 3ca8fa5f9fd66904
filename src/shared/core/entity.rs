use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Version of an entity inside one store. `0` is the creation version.
pub type Version = u64;

/// One immutable version of a caller-identified record.
///
/// `data` is carried verbatim; the store never looks inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: Version,
    #[serde(default)]
    pub data: Json,
}

impl Entity {
    pub fn new(id: impl Into<String>, data: Json) -> Self {
        Self {
            id: id.into(),
            version: 0,
            data,
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}

/// Write-acceptance policy for `append`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Always append at latest + 1.
    None,
    /// Append only if the latest version equals the expected one.
    Optimistic { expected: Version },
}
