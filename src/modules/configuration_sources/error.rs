use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationSourceError {
    #[error("can't read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse configuration file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no eventstores defined")]
    NoEventStoresDefined,

    #[error("can't fetch configurations from {endpoint}: {message}")]
    Fetch { endpoint: String, message: String },

    #[error("no configuration found for eventstores {names:?}")]
    NoMatchingConfiguration { names: Vec<String> },
}
