//! Engine configuration.
//!
//! Every weight and threshold the engine uses lives here. Defaults reproduce
//! the registry's published behaviour; deployments may tune them.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Verification older than this many days needs a recheck
    #[serde(default = "default_recheck_threshold_days")]
    pub recheck_threshold_days: i64,

    /// Alert priority weights
    #[serde(default)]
    pub priority: PriorityWeights,

    /// Portfolio risk score weights
    #[serde(default)]
    pub risk: RiskWeights,

    /// Number of trailing serial characters shown in the public tier
    #[serde(default = "default_serial_visible_suffix")]
    pub serial_visible_suffix: usize,

    /// Maximum sighting note length in characters
    #[serde(default = "default_sighting_note_limit")]
    pub sighting_note_limit: usize,

    /// Prefix for generated case ids
    #[serde(default = "default_case_id_prefix")]
    pub case_id_prefix: String,

    /// PBKDF2 rounds for new credential hashes
    #[serde(default = "default_credential_iterations")]
    pub credential_iterations: u32,
}

/// Weights summed into an alert's priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    #[serde(default = "default_priority_stolen")]
    pub stolen: u32,
    #[serde(default = "default_priority_history_unknown")]
    pub history_unknown: u32,
    #[serde(default = "default_priority_not_registered")]
    pub not_registered: u32,
    #[serde(default = "default_priority_needs_recheck")]
    pub needs_recheck: u32,
}

/// Weights for the portfolio risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    #[serde(default = "default_risk_stolen")]
    pub stolen: u32,
    #[serde(default = "default_risk_history_unknown")]
    pub history_unknown: u32,
    #[serde(default = "default_risk_one")]
    pub not_registered: u32,
    #[serde(default = "default_risk_one")]
    pub needs_recheck: u32,
    #[serde(default = "default_risk_scale")]
    pub scale: u32,
    #[serde(default = "default_risk_cap")]
    pub cap: u32,
}

fn default_recheck_threshold_days() -> i64 {
    180
}
fn default_serial_visible_suffix() -> usize {
    4
}
fn default_sighting_note_limit() -> usize {
    500
}
fn default_case_id_prefix() -> String {
    "ER-CASE".to_string()
}
fn default_credential_iterations() -> u32 {
    100_000
}
fn default_priority_stolen() -> u32 {
    100
}
fn default_priority_history_unknown() -> u32 {
    60
}
fn default_priority_not_registered() -> u32 {
    40
}
fn default_priority_needs_recheck() -> u32 {
    20
}
fn default_risk_stolen() -> u32 {
    4
}
fn default_risk_history_unknown() -> u32 {
    2
}
fn default_risk_one() -> u32 {
    1
}
fn default_risk_scale() -> u32 {
    20
}
fn default_risk_cap() -> u32 {
    100
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            stolen: default_priority_stolen(),
            history_unknown: default_priority_history_unknown(),
            not_registered: default_priority_not_registered(),
            needs_recheck: default_priority_needs_recheck(),
        }
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            stolen: default_risk_stolen(),
            history_unknown: default_risk_history_unknown(),
            not_registered: default_risk_one(),
            needs_recheck: default_risk_one(),
            scale: default_risk_scale(),
            cap: default_risk_cap(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recheck_threshold_days: default_recheck_threshold_days(),
            priority: PriorityWeights::default(),
            risk: RiskWeights::default(),
            serial_visible_suffix: default_serial_visible_suffix(),
            sighting_note_limit: default_sighting_note_limit(),
            case_id_prefix: default_case_id_prefix(),
            credential_iterations: default_credential_iterations(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON text. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("parsing engine config {}", path.display()))?;

        log::info!(
            "ENGINE_CONFIG_LOADED path={} recheck_threshold_days={}",
            path.display(),
            config.recheck_threshold_days
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.recheck_threshold_days < 0 {
            return Err(ConfigError::Invalid(
                "recheck_threshold_days must not be negative".to_string(),
            ));
        }
        if self.credential_iterations == 0 {
            return Err(ConfigError::Invalid(
                "credential_iterations must be at least 1".to_string(),
            ));
        }
        if self.case_id_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("case_id_prefix is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_weights() {
        let config = EngineConfig::default();
        assert_eq!(config.recheck_threshold_days, 180);
        assert_eq!(config.priority.stolen, 100);
        assert_eq!(config.priority.history_unknown, 60);
        assert_eq!(config.priority.not_registered, 40);
        assert_eq!(config.priority.needs_recheck, 20);
        assert_eq!(config.risk.stolen, 4);
        assert_eq!(config.risk.scale, 20);
        assert_eq!(config.risk.cap, 100);
        assert_eq!(config.sighting_note_limit, 500);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{"recheck_threshold_days": 90, "risk": {"scale": 10}}"#)
                .unwrap();
        assert_eq!(config.recheck_threshold_days, 90);
        assert_eq!(config.risk.scale, 10);
        assert_eq!(config.risk.stolen, 4);
        assert_eq!(config.priority, PriorityWeights::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(EngineConfig::from_json_str(r#"{"recheck_threshold_days": -1}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"credential_iterations": 0}"#).is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
    }
}
