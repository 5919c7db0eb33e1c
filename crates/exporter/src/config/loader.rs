use std::collections::HashSet;
use std::path::Path;

use lagwatch_alert::condition::ConditionKind;

use super::schema::{EndpointList, ExporterConfig};

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Validation(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn load_from_file(path: &Path) -> Result<ExporterConfig, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<ExporterConfig, LoadError> {
    let mut cfg: ExporterConfig = serde_yaml::from_str(yaml)?;
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut ExporterConfig) {
    if let Ok(urls) = std::env::var("LAGWATCH_ENDPOINTS") {
        cfg.endpoints = EndpointList::Csv(urls);
    }
    if let Ok(addr) = std::env::var("LAGWATCH_BIND_ADDR") {
        cfg.bind_addr = addr;
    }
}

fn validate(cfg: &ExporterConfig) -> Result<(), LoadError> {
    if cfg.poll_interval_seconds == 0 {
        return Err(LoadError::Validation(
            "poll_interval_seconds must be > 0".into(),
        ));
    }
    if cfg.eval_interval_seconds == 0 {
        return Err(LoadError::Validation(
            "eval_interval_seconds must be > 0".into(),
        ));
    }
    if cfg.request_timeout_seconds == 0 {
        return Err(LoadError::Validation(
            "request_timeout_seconds must be > 0".into(),
        ));
    }
    if cfg.max_concurrent_polls == 0 {
        return Err(LoadError::Validation(
            "max_concurrent_polls must be > 0".into(),
        ));
    }
    if cfg.router.url.is_empty() {
        return Err(LoadError::Validation("router.url must not be empty".into()));
    }

    let mut names = HashSet::new();
    for condition in &cfg.conditions {
        if condition.name.is_empty() {
            return Err(LoadError::Validation("condition name must not be empty".into()));
        }
        if !names.insert(condition.name.as_str()) {
            return Err(LoadError::Validation(format!(
                "duplicate condition name '{}'",
                condition.name
            )));
        }
        if let ConditionKind::LagGrowth { window_seconds, .. } = condition.kind {
            if window_seconds == 0 {
                return Err(LoadError::Validation(format!(
                    "condition '{}': window_seconds must be > 0",
                    condition.name
                )));
            }
            // Eviction keeps samples within max_lookback of the latest
            // tick; a window equal to it would leave no boundary sample
            // and the condition could never become eligible.
            if window_seconds >= cfg.max_lookback_seconds {
                return Err(LoadError::Validation(format!(
                    "condition '{}': window_seconds {} must be less than max_lookback_seconds {}",
                    condition.name, window_seconds, cfg.max_lookback_seconds
                )));
            }
        }
    }
    Ok(())
}
