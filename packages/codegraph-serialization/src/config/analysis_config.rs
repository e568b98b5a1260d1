use super::error::{ConfigError, ConfigResult};
use super::io::AnalysisConfigV1;
use crate::features::policy::{Policy, PolicyKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Call-string length accepted for `k-CFA`
const CALL_STRING_RANGE: (u32, u32) = (1, 8);
/// Smushing bound accepted for `0-x-CFA`
const ZERO_X_RANGE: (u32, u32) = (0, 1024);

/// Candidate-set pruning for field type resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PruningConfig {
    /// Restrict oversized candidate sets to application types
    pub enabled: bool,

    /// Candidate count above which pruning applies
    pub threshold: usize,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 100,
        }
    }
}

impl PruningConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.threshold == 0 || self.threshold > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "pruning.threshold",
                self.threshold,
                1,
                1_000_000,
                "Threshold is a candidate count; 100 is the usual setting",
            ));
        }
        Ok(())
    }
}

/// Configuration of one serialization-aware call-graph run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Policy for ordinary application and library code
    pub primary: Policy,

    /// Policy for synthetic stream model nodes
    pub secondary: Policy,

    #[serde(default)]
    pub pruning: PruningConfig,

    /// Upper bound on propagate/instrument rounds (None=unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            primary: Policy::zero_x_container(1),
            secondary: Policy::call_strings(1),
            pruning: PruningConfig::default(),
            max_rounds: None,
        }
    }
}

impl AnalysisConfig {
    pub fn new(primary: Policy, secondary: Policy) -> Self {
        Self {
            primary,
            secondary,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        validate_policy("primary", &self.primary)?;
        validate_policy("secondary", &self.secondary)?;
        self.pruning.validate()?;

        if let Some(n) = self.max_rounds {
            if n == 0 || n > 10_000 {
                return Err(ConfigError::Validation(
                    "max_rounds must be 1..=10000 or None for unlimited".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Builder: Set primary policy
    pub fn primary(mut self, v: Policy) -> Self {
        self.primary = v;
        self
    }

    /// Builder: Set secondary policy
    pub fn secondary(mut self, v: Policy) -> Self {
        self.secondary = v;
        self
    }

    /// Builder: Set pruning threshold
    pub fn pruning_threshold(mut self, v: usize) -> Self {
        self.pruning.threshold = v;
        self
    }

    /// Builder: Enable or disable pruning
    pub fn pruning_enabled(mut self, v: bool) -> Self {
        self.pruning.enabled = v;
        self
    }

    /// Builder: Set max_rounds
    pub fn max_rounds(mut self, v: Option<usize>) -> Self {
        self.max_rounds = v;
        self
    }

    /// Parse and validate a YAML v1 document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.get("version").is_none() {
            return Err(ConfigError::MissingVersion);
        }

        let export: AnalysisConfigV1 = serde_yaml::from_value(value)?;
        if export.version != 1 {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: vec![1],
            });
        }

        let config = export.analysis;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export to YAML v1
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = AnalysisConfigV1 {
            version: 1,
            analysis: self.clone(),
        };
        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }

    /// Human-readable one-line description
    pub fn describe(&self) -> String {
        let pruning = if self.pruning.enabled {
            format!("pruning>{}", self.pruning.threshold)
        } else {
            "no pruning".to_string()
        };
        format!(
            "primary={} secondary={} {}",
            self.primary, self.secondary, pruning
        )
    }
}

fn validate_policy(field: &str, policy: &Policy) -> ConfigResult<()> {
    let (min, max, hint) = match policy.kind() {
        PolicyKind::BoundedCallStrings => (
            CALL_STRING_RANGE.0,
            CALL_STRING_RANGE.1,
            "Call strings longer than 8 rarely terminate on real programs",
        ),
        PolicyKind::ZeroXObjectSensitive | PolicyKind::ZeroXContainerSensitive => (
            ZERO_X_RANGE.0,
            ZERO_X_RANGE.1,
            "Smushing bound is allocations per type per method",
        ),
    };
    if policy.bound() < min || policy.bound() > max {
        return Err(ConfigError::range_with_hint(
            format!("{}.bound", field),
            policy.bound(),
            min,
            max,
            hint,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pruning.threshold, 100);
        assert!(config.pruning.enabled);
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::default()
            .primary(Policy::call_strings(2))
            .secondary(Policy::zero_x(1))
            .pruning_threshold(50)
            .max_rounds(Some(20));
        assert_eq!(config.primary, Policy::call_strings(2));
        assert_eq!(config.secondary, Policy::zero_x(1));
        assert_eq!(config.pruning.threshold, 50);
        assert_eq!(config.max_rounds, Some(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_describe() {
        let config = AnalysisConfig::new(Policy::call_strings(1), Policy::call_strings(2));
        assert_eq!(config.describe(), "primary=1-CFA secondary=2-CFA pruning>100");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EDGE CASES
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_zero_call_string_rejected() {
        let config = AnalysisConfig::default().primary(Policy::call_strings(0));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("primary.bound"));
    }

    #[test]
    fn test_zero_x_zero_is_allowed() {
        let config = AnalysisConfig::default().secondary(Policy::zero_x(0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_zero_rejected() {
        let config = AnalysisConfig::default().pruning_threshold(0);
        assert!(matches!(config.validate(), Err(ConfigError::Range { .. })));
    }

    #[test]
    fn test_max_rounds_bounds() {
        assert!(AnalysisConfig::default()
            .max_rounds(Some(0))
            .validate()
            .is_err());
        assert!(AnalysisConfig::default()
            .max_rounds(Some(10_001))
            .validate()
            .is_err());
    }
}
