use serde::Deserialize;
use std::path::Path;

use super::error::ConfigurationSourceError;
use crate::shared::core::configuration::Configuration;

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigurationFile {
    Many(Vec<Configuration>),
    One(Box<Configuration>),
}

/// Reads store configurations from a local YAML (or JSON) file holding either
/// one configuration or a list of them.
pub async fn load(path: impl AsRef<Path>) -> Result<Vec<Configuration>, ConfigurationSourceError> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| ConfigurationSourceError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse(&raw).map_err(|source| ConfigurationSourceError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn parse(raw: &[u8]) -> Result<Vec<Configuration>, serde_yaml::Error> {
    Ok(match serde_yaml::from_slice(raw)? {
        ConfigurationFile::Many(configurations) => configurations,
        ConfigurationFile::One(configuration) => vec![*configuration],
    })
}
