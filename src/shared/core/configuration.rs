use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const EVENTSTORE_KIND: &str = "eventstore";

/// Declares how to build one named store.
///
/// Consumed once per store (re)creation; the live store it produced is the
/// authoritative state, not this value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Configuration {
    #[serde(default = "default_kind")]
    pub kind: String,
    pub metadata: ConfigurationMetadata,
    pub spec: Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationMetadata {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Spec {
    #[serde(rename = "type")]
    pub backend_type: String,
    #[serde(default)]
    pub metadata: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataItem {
    pub name: String,
    #[serde(default)]
    pub value: String,
    // Carried through but never resolved here.
    #[serde(
        default,
        rename = "secretKeyRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub secret_key_ref: Option<SecretKeyRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretKeyRef {
    pub name: String,
    pub key: String,
}

fn default_kind() -> String {
    EVENTSTORE_KIND.to_string()
}

impl Configuration {
    pub fn new(name: impl Into<String>, backend_type: impl Into<String>) -> Self {
        Self {
            kind: default_kind(),
            metadata: ConfigurationMetadata { name: name.into() },
            spec: Spec {
                backend_type: backend_type.into(),
                metadata: Vec::new(),
            },
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.metadata.push(MetadataItem {
            name: name.into(),
            value: value.into(),
            secret_key_ref: None,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn backend_type(&self) -> &str {
        &self.spec.backend_type
    }

    /// Flattens the ordered metadata list into a property map.
    /// A later item wins over an earlier one with the same name.
    pub fn properties(&self) -> HashMap<String, String> {
        self.spec
            .metadata
            .iter()
            .map(|item| (item.name.clone(), item.value.clone()))
            .collect()
    }
}
