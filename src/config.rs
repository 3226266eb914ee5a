//! relq configuration (`relq.toml`).
//!
//! ```toml
//! dialect = "postgres"
//! limit = 1000
//! max_depth = 512
//! log_filter = "relq=debug"
//! ```

use crate::dialect::Dialect;
use crate::error::{RelqError, RelqResult};
use crate::transpiler::{CompileOptions, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE: &str = "relq.toml";

/// Tool-wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelqConfig {
    /// Dialect used when none is given on the command line.
    pub dialect: Dialect,
    /// Outermost row limit applied to every compiled query.
    pub limit: Option<u64>,
    pub max_depth: usize,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for RelqConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            limit: None,
            max_depth: DEFAULT_MAX_DEPTH,
            log_filter: "warn".to_string(),
        }
    }
}

impl RelqConfig {
    pub fn builder() -> RelqConfigBuilder {
        RelqConfigBuilder::default()
    }

    /// `./relq.toml`, then `<config dir>/relq/relq.toml`, then defaults.
    pub fn load() -> RelqResult<Self> {
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("relq").join(CONFIG_FILE));
        }
        paths
    }

    pub fn from_file(path: &Path) -> RelqResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = content
            .parse::<Self>()
            .map_err(|e| RelqError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), dialect = %config.dialect, "loaded config");
        Ok(config)
    }

    /// Options for one compilation under this configuration.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            limit: self.limit,
            max_depth: self.max_depth,
            ..CompileOptions::default()
        }
    }
}

impl std::str::FromStr for RelqConfig {
    type Err = RelqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: RelqConfig = toml::from_str(s).map_err(|e| RelqError::Config(e.to_string()))?;
        if config.max_depth == 0 {
            return Err(RelqError::Config("max_depth must be positive".to_string()));
        }
        Ok(config)
    }
}

/// Builder for [`RelqConfig`].
#[derive(Debug, Default)]
pub struct RelqConfigBuilder {
    config: RelqConfig,
}

impl RelqConfigBuilder {
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.config.dialect = dialect;
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.config.limit = Some(n);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn build(self) -> RelqConfig {
        self.config
    }
}
