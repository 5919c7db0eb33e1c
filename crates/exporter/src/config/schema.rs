use serde::Deserialize;

use lagwatch_alert::condition::Condition;
use lagwatch_alert::inhibit::InhibitRule;

#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// Connect endpoints to poll. Empty is allowed: the exporter simply
    /// serves no connector metrics.
    #[serde(default)]
    pub endpoints: EndpointList,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_eval_interval")]
    pub eval_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_concurrent_polls")]
    pub max_concurrent_polls: usize,
    /// How long lag history is retained for growth lookback. Growth
    /// windows must be strictly shorter than this.
    #[serde(default = "default_max_lookback")]
    pub max_lookback_seconds: u64,
    /// How long a resolved instance lingers before garbage collection.
    #[serde(default = "default_resolved_retention")]
    pub resolved_retention_seconds: u64,
    pub router: RouterConfig,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub inhibit: Vec<InhibitRule>,
}

/// Either a comma-separated URL string or a structured list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EndpointList {
    Csv(String),
    List(Vec<String>),
}

impl Default for EndpointList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl EndpointList {
    pub fn urls(&self) -> Vec<String> {
        let raw: Vec<String> = match self {
            Self::Csv(s) => s.split(',').map(str::to_string).collect(),
            Self::List(v) => v.clone(),
        };
        raw.into_iter()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// External alert router webhook receiving event batches.
    pub url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:9407".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_eval_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_concurrent_polls() -> usize {
    8
}

fn default_max_lookback() -> u64 {
    3600
}

fn default_resolved_retention() -> u64 {
    300
}
