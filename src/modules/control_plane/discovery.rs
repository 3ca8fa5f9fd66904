// Where the control plane finds running sidecars.
//
// In a cluster the addresses come from listing the network endpoints labeled as
// eventstore-enabled; that listing lives outside this crate. The control plane
// only depends on the trait.

use async_trait::async_trait;

#[async_trait]
pub trait EndpointDiscovery: Send + Sync {
    /// Base URLs of the sidecars, without a trailing slash.
    async fn discover(&self) -> anyhow::Result<Vec<String>>;
}

/// A fixed list of sidecar addresses.
#[derive(Debug, Clone, Default)]
pub struct StaticEndpoints {
    addresses: Vec<String>,
}

impl StaticEndpoints {
    pub fn new(addresses: impl IntoIterator<Item = String>) -> Self {
        Self {
            addresses: addresses
                .into_iter()
                .map(|a| a.trim().trim_end_matches('/').to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    /// Comma separated list, e.g. `http://10.0.0.4:5600, http://10.0.0.5:5600`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').map(String::from))
    }
}

#[async_trait]
impl EndpointDiscovery for StaticEndpoints {
    async fn discover(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.addresses.clone())
    }
}

#[cfg(test)]
mod static_endpoints_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_normalize_a_comma_separated_list() {
        let endpoints = StaticEndpoints::parse(" http://a:5600/ ,,http://b:5600");

        assert_eq!(
            endpoints.discover().await.unwrap(),
            vec!["http://a:5600", "http://b:5600"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_discover_nothing_from_an_empty_list() {
        assert!(StaticEndpoints::parse("").discover().await.unwrap().is_empty());
    }
}
