// Pushes a configuration to many sidecars.
//
// Purpose
// - Keep a fleet of sidecars in line with the control plane's catalog without a
//   shared database.
//
// Responsibilities
// - One task per address, at most `max_concurrent` in flight.
// - Each push succeeds or fails on its own: no retry, success means a 2xx.
// - A failed push leaves that sidecar on its previous configuration until the
//   next successful push.

use crate::shared::core::configuration::Configuration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push to {address} failed: {message}")]
    Transport { address: String, message: String },

    #[error("push to {address} rejected with status {status}")]
    Rejected { address: String, status: u16 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushResult {
    pub address: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PushResult {
    fn from_outcome(address: &str, outcome: Result<u16, PushError>) -> Self {
        match outcome {
            Ok(status) => Self {
                address: address.to_string(),
                ok: true,
                status: Some(status),
                error: None,
            },
            Err(err) => Self {
                address: address.to_string(),
                ok: false,
                status: match &err {
                    PushError::Rejected { status, .. } => Some(*status),
                    PushError::Transport { .. } => None,
                },
                error: Some(err.to_string()),
            },
        }
    }
}

/// Per-address outcome of one propagation, in the order addresses were given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushReport {
    pub name: String,
    pub pushed: Vec<PushResult>,
}

impl PushReport {
    pub fn succeeded(&self) -> usize {
        self.pushed.iter().filter(|r| r.ok).count()
    }
}

pub struct ConfigurationPublisher {
    client: reqwest::Client,
    max_concurrent: usize,
}

impl ConfigurationPublisher {
    pub fn new(max_concurrent: usize, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_concurrent: max_concurrent.max(1),
        })
    }

    async fn push_one(
        client: &reqwest::Client,
        address: &str,
        configuration: &Configuration,
    ) -> Result<u16, PushError> {
        let url = format!("{address}/configurations/{}", configuration.name());
        let response = client
            .post(&url)
            .json(configuration)
            .send()
            .await
            .map_err(|err| PushError::Transport {
                address: address.to_string(),
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PushError::Rejected {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(status.as_u16())
    }

    pub async fn publish(&self, addresses: &[String], configuration: &Configuration) -> PushReport {
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let configuration = Arc::new(configuration.clone());
        let mut tasks = JoinSet::new();

        for (index, address) in addresses.iter().cloned().enumerate() {
            let permits = permits.clone();
            let client = self.client.clone();
            let configuration = configuration.clone();
            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => Self::push_one(&client, &address, &configuration).await,
                    Err(err) => Err(PushError::Transport {
                        address: address.clone(),
                        message: err.to_string(),
                    }),
                };
                match &outcome {
                    Ok(_) => info!(
                        eventstore = configuration.name(),
                        address = %address,
                        "propagation: configuration pushed"
                    ),
                    Err(err) => warn!(
                        eventstore = configuration.name(),
                        error = %err,
                        "propagation: configuration push failed"
                    ),
                }
                (index, PushResult::from_outcome(&address, outcome))
            });
        }

        let mut pushed: Vec<PushResult> = addresses
            .iter()
            .map(|address| PushResult {
                address: address.clone(),
                ok: false,
                status: None,
                error: Some("push task did not complete".to_string()),
            })
            .collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => pushed[index] = result,
                Err(err) => warn!(error = %err, "propagation: push task aborted"),
            }
        }

        PushReport {
            name: configuration.name().to_string(),
            pushed,
        }
    }
}
