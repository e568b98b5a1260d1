//! Analysis configuration
//!
//! - `AnalysisConfig`: policy pair, pruning and round limits
//! - `io`: YAML schema v1
//! - `error`: configuration errors

mod analysis_config;
pub mod error;
pub mod io;

pub use analysis_config::{AnalysisConfig, PruningConfig};
pub use error::{ConfigError, ConfigResult};
