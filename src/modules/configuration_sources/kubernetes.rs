// Startup configuration for a sidecar running next to an operator.
//
// The sidecar is told which stores it serves (a comma separated list, as it
// comes out of a pod annotation) and asks the operator for the catalog once.
// Later changes arrive as pushes on the configuration endpoint.

use std::time::Duration;
use tracing::info;

use super::error::ConfigurationSourceError;
use crate::shared::core::configuration::Configuration;

/// Splits the served store list, trimming whitespace and single quotes.
pub fn parse_eventstore_names(raw: &str) -> Result<Vec<String>, ConfigurationSourceError> {
    let names: Vec<String> = raw
        .split(',')
        .map(|name| name.trim().trim_matches('\'').trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(ConfigurationSourceError::NoEventStoresDefined);
    }
    Ok(names)
}

pub struct OperatorClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OperatorClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ConfigurationSourceError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ConfigurationSourceError::Fetch {
                endpoint: endpoint.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { client, endpoint })
    }

    async fn fetch_all(&self) -> Result<Vec<Configuration>, ConfigurationSourceError> {
        let fetch_error = |message: String| ConfigurationSourceError::Fetch {
            endpoint: self.endpoint.clone(),
            message,
        };
        let response = self
            .client
            .get(format!("{}/eventstores", self.endpoint))
            .send()
            .await
            .map_err(|err| fetch_error(err.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("status {}", response.status())));
        }
        response
            .json::<Vec<Configuration>>()
            .await
            .map_err(|err| fetch_error(err.to_string()))
    }

    /// Configurations for the served stores only. Fails when none of them is
    /// known to the operator.
    pub async fn load(&self, names: &[String]) -> Result<Vec<Configuration>, ConfigurationSourceError> {
        let configurations: Vec<Configuration> = self
            .fetch_all()
            .await?
            .into_iter()
            .filter(|c| names.iter().any(|name| name == c.name()))
            .collect();
        if configurations.is_empty() {
            return Err(ConfigurationSourceError::NoMatchingConfiguration {
                names: names.to_vec(),
            });
        }
        info!(
            endpoint = %self.endpoint,
            eventstores = configurations.len(),
            "configuration source: loaded from operator"
        );
        Ok(configurations)
    }
}
