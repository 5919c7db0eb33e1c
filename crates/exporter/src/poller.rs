use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::registry::Endpoint;

/// `GET /connectors?expand=status` response entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawExpanded {
    pub status: RawConnectorStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawConnectorStatus {
    pub connector: RawState,
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawState {
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    pub id: u32,
    pub state: String,
}

/// Raw listing for one endpoint, keyed by connector name.
pub type RawEndpointStatus = HashMap<String, RawExpanded>;

#[derive(Debug)]
pub enum PollError {
    Timeout,
    Unreachable(String),
    Protocol(String),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Unreachable(msg) => write!(f, "unreachable: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
        }
    }
}

impl std::error::Error for PollError {}

/// Queries every registered endpoint once per cycle with bounded
/// parallelism and a per-request timeout. Failures are isolated: the
/// result set always carries one entry per endpoint.
pub struct Poller {
    client: reqwest::Client,
    max_concurrent: usize,
}

impl Poller {
    pub fn new(request_timeout: Duration, max_concurrent: usize) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            max_concurrent,
        })
    }

    pub async fn poll_once(
        &self,
        endpoints: &[Endpoint],
    ) -> Vec<(Endpoint, Result<RawEndpointStatus, PollError>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut set = JoinSet::new();

        for (idx, endpoint) in endpoints.iter().cloned().enumerate() {
            let client = self.client.clone();
            let semaphore = semaphore.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = fetch_status(&client, &endpoint.base_url).await;
                (idx, endpoint, result)
            });
        }

        let mut results: Vec<Option<(Endpoint, Result<RawEndpointStatus, PollError>)>> =
            (0..endpoints.len()).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, endpoint, result)) => results[idx] = Some((endpoint, result)),
                Err(e) => tracing::error!(error = %e, "poll task panicked"),
            }
        }

        // A panicked task still yields an entry for its endpoint.
        results
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.unwrap_or_else(|| {
                    (
                        endpoints[idx].clone(),
                        Err(PollError::Unreachable("poll task failed".into())),
                    )
                })
            })
            .collect()
    }
}

async fn fetch_status(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<RawEndpointStatus, PollError> {
    let url = format!("{base_url}/connectors?expand=status");
    let response = client.get(&url).send().await.map_err(|e| {
        if e.is_timeout() {
            PollError::Timeout
        } else {
            PollError::Unreachable(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PollError::Protocol(format!("unexpected status {status}")));
    }

    response
        .json::<RawEndpointStatus>()
        .await
        .map_err(|e| PollError::Protocol(e.to_string()))
}
