//! Planner configuration
//!
//! Read from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! strategy = "sorted-backtracking"
//! preprocessing_budget_ms = 3000
//! log_format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use whisker_common::{Error, Result};

use crate::tsp::SearchStrategy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    pub strategy: SearchStrategy,
    /// Preprocessing time after which a warning is logged. The search is never cut short.
    pub preprocessing_budget_ms: Option<u64>,
    pub log_format: LogFormat,
}

impl PlannerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
