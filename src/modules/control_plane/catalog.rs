use crate::shared::core::configuration::Configuration;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Authoritative store configurations held by the control plane, keyed by name.
#[derive(Default)]
pub struct ConfigurationCatalog {
    inner: RwLock<BTreeMap<String, Configuration>>,
}

impl ConfigurationCatalog {
    pub fn new(configurations: impl IntoIterator<Item = Configuration>) -> Self {
        Self {
            inner: RwLock::new(
                configurations
                    .into_iter()
                    .map(|c| (c.name().to_string(), c))
                    .collect(),
            ),
        }
    }

    /// All configurations, ordered by name.
    pub async fn list(&self) -> Vec<Configuration> {
        self.inner.read().await.values().cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<Configuration> {
        self.inner.read().await.get(name).cloned()
    }

    /// Returns the configuration it replaced, if any.
    pub async fn upsert(&self, configuration: Configuration) -> Option<Configuration> {
        self.inner
            .write()
            .await
            .insert(configuration.name().to_string(), configuration)
    }
}
