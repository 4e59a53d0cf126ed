//! Tunable limits for the rule catalog.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigurationError;
use crate::primitives::parse_go_duration;

/// Limits and naming conventions the struct rules consult.
///
/// Every field has a default, so an empty YAML document is a valid configuration.
/// Durations are Go duration strings (`5m`, `1h30m`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Prefix every threat-feed header ConfigMap/Secret name must carry, before `-<feedName>`.
    pub threat_feed_secret_prefix: String,
    /// Shortest permitted threat-feed pull period.
    pub min_pull_period: String,
    /// Shortest permitted alert evaluation period.
    pub alert_min_period: String,
    /// Shortest permitted alert lookback window.
    pub alert_min_lookback: String,
    /// Upper bound on the summed size of annotation keys and values, in bytes.
    pub annotation_size_limit: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            threat_feed_secret_prefix: "globalthreatfeed".to_string(),
            min_pull_period: "5m".to_string(),
            alert_min_period: "1m".to_string(),
            alert_min_lookback: "1m".to_string(),
            annotation_size_limit: 256 * 1024,
        }
    }
}

/// [`ValidatorConfig`] with its durations parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    pub threat_feed_secret_prefix: String,
    pub min_pull_period: Duration,
    pub alert_min_period: Duration,
    pub alert_min_lookback: Duration,
    pub annotation_size_limit: usize,
}

impl ValidatorConfig {
    /// Reads a configuration from YAML. Missing keys keep their defaults.
    pub fn from_yaml(input: &str) -> Result<ValidatorConfig, ConfigurationError> {
        if input.trim().is_empty() {
            return Ok(ValidatorConfig::default());
        }
        serde_saphyr::from_str(input).map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))
    }

    /// Parses the duration strings and checks the limits are usable.
    pub fn resolve(&self) -> Result<Limits, ConfigurationError> {
        let duration = |key: &str, raw: &str| {
            parse_go_duration(raw)
                .map_err(|e| ConfigurationError::InvalidConfig(format!("{}: {}", key, e)))
        };
        if self.threat_feed_secret_prefix.is_empty() {
            return Err(ConfigurationError::InvalidConfig(
                "threatFeedSecretPrefix must not be empty".to_string(),
            ));
        }
        Ok(Limits {
            threat_feed_secret_prefix: self.threat_feed_secret_prefix.clone(),
            min_pull_period: duration("minPullPeriod", &self.min_pull_period)?,
            alert_min_period: duration("alertMinPeriod", &self.alert_min_period)?,
            alert_min_lookback: duration("alertMinLookback", &self.alert_min_lookback)?,
            annotation_size_limit: self.annotation_size_limit,
        })
    }
}
