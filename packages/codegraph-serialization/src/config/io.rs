//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema. Loading and export live on `AnalysisConfig`.

use super::AnalysisConfig;
use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfigV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    pub analysis: AnalysisConfig,
}
