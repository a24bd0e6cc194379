//! Dashboard configuration.
//!
//! Settings come from an optional TOML file layered with `PULLDASH_*`
//! environment variables; command-line flags are applied on top by the
//! binary.
//!
//! ```toml
//! endpoint = "http://192.168.1.20:8000/pull"
//! interval = "1s"
//! highlight = "1s"
//! missing = "zero"     # or "fail"
//! history = 50
//!
//! [[bind]]
//! key = "calculated.new_limit"
//! label = "Inverter limit"
//! previous = true
//!
//! [[series]]
//! id = "calculated.new_limit"
//! label = "Limit WR"
//! color = "rgb(128, 128, 0)"
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use crate::data::duration::deserialize_duration;
use crate::data::highlight::DEFAULT_HOLD;
use crate::data::history::DEFAULT_CAPACITY;
use crate::data::{Binding, BindingKey, MissingPolicy, SeriesConfig};
use crate::poll::http::DEFAULT_TIMEOUT;
use crate::poll::DEFAULT_INTERVAL;

/// Environment variable prefix (`PULLDASH_ENDPOINT`, `PULLDASH_MISSING`, ...).
pub const ENV_PREFIX: &str = "PULLDASH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything needed to build a dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// URL polled with `GET`.
    pub endpoint: String,
    /// Delay between the end of one poll and the start of the next.
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    /// How long a changed value stays emphasised.
    #[serde(deserialize_with = "deserialize_duration")]
    pub highlight: Duration,
    /// Per-request timeout.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Behaviour for keys that do not resolve.
    pub missing: MissingPolicy,
    /// Number of points kept for the chart.
    pub history: usize,
    /// Bound rows, in display order.
    #[serde(rename = "bind")]
    pub bindings: Vec<Binding>,
    /// Chart lines.
    pub series: Vec<SeriesConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/pull".to_string(),
            interval: DEFAULT_INTERVAL,
            highlight: DEFAULT_HOLD,
            timeout: DEFAULT_TIMEOUT,
            missing: MissingPolicy::default(),
            history: DEFAULT_CAPACITY,
            bindings: Vec::new(),
            series: SeriesConfig::defaults(),
        }
    }
}

impl DashboardConfig {
    /// Load from `path` (if it exists) and the `PULLDASH_*` environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: &Path, prefix: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        tracing::debug!(path = %path.display(), endpoint = %loaded.endpoint, "configuration loaded");
        Ok(loaded)
    }

    /// Reject settings the dashboard cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint is empty".to_string()));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid("interval must be greater than zero".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".to_string()));
        }
        if self.history == 0 {
            return Err(ConfigError::Invalid("history must hold at least one point".to_string()));
        }
        if let Some(series) = self.series.iter().find(|s| BindingKey::parse(&s.id).is_err()) {
            return Err(ConfigError::Invalid(format!(
                "series id '{}' is not a valid key",
                series.id
            )));
        }
        Ok(())
    }

    /// Rows to show. Falls back to one row per chart series when no
    /// bindings are configured, since the chart only sees bound keys.
    pub fn effective_bindings(&self) -> Vec<Binding> {
        if !self.bindings.is_empty() {
            return self.bindings.clone();
        }
        self.series
            .iter()
            .filter_map(|s| {
                let key = BindingKey::parse(&s.id).ok()?;
                Some(Binding {
                    key,
                    label: Some(s.label.clone()),
                    previous: false,
                })
            })
            .collect()
    }
}
