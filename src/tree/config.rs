//! Configuration options for tree construction.
//!
//! The die size alone fixes the combinatorial size of the game. The remaining
//! fields bound the resources a build may consume and pick between sequential
//! and parallel construction.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default node budget. Large enough for `D = 4` (2,097,137 nodes).
pub const DEFAULT_MAX_NODES: u64 = 5_000_000;

/// Configuration for a tree build.
///
/// # Example
/// ```
/// use dice_tree::tree::BuildConfig;
///
/// let config = BuildConfig::default().with_die_size(3);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_nodes, Some(5_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of faces on each die (`D`). Must be at least 1.
    pub die_size: u8,

    /// Maximum number of nodes the build may allocate.
    ///
    /// `None` removes the limit; the process may then run out of memory for
    /// large die sizes.
    pub max_nodes: Option<u64>,

    /// Maximum estimated heap footprint of the tree, in bytes.
    pub max_memory_bytes: Option<u64>,

    /// Build the subtrees under each chance outcome on rayon workers.
    ///
    /// The resulting tree is identical to a sequential build.
    pub parallel: bool,

    /// Number of worker threads for a parallel build.
    ///
    /// `None` uses rayon's global pool.
    pub num_threads: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            die_size: 2,
            max_nodes: Some(DEFAULT_MAX_NODES),
            max_memory_bytes: None,
            parallel: false,
            num_threads: None,
        }
    }
}

impl BuildConfig {
    /// Create a new BuildConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with no resource limits at all.
    pub fn unbounded() -> Self {
        Self {
            max_nodes: None,
            max_memory_bytes: None,
            ..Default::default()
        }
    }

    /// Builder method: set the die size.
    pub fn with_die_size(mut self, die_size: u8) -> Self {
        self.die_size = die_size;
        self
    }

    /// Builder method: set the node budget.
    pub fn with_max_nodes(mut self, max_nodes: Option<u64>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Builder method: set the memory budget.
    pub fn with_max_memory(mut self, bytes: Option<u64>) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    /// Builder method: enable or disable parallel construction.
    pub fn with_parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.die_size < 1 {
            return Err(ConfigError::InvalidDieSize(self.die_size));
        }

        if self.max_nodes == Some(0) {
            return Err(ConfigError::InvalidBudget("node"));
        }

        if self.max_memory_bytes == Some(0) {
            return Err(ConfigError::InvalidBudget("memory"));
        }

        if self.num_threads == Some(0) {
            return Err(ConfigError::InvalidThreads(0));
        }

        Ok(())
    }
}

/// Errors that can occur when validating or loading a build configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Die size must be at least 1.
    InvalidDieSize(u8),
    /// A budget was set to zero.
    InvalidBudget(&'static str),
    /// Thread count must be at least 1.
    InvalidThreads(usize),
    /// The game was created for a different die size than configured.
    DieSizeMismatch {
        /// Die size in the configuration.
        config: u8,
        /// Die size of the game handed to the factory.
        game: u8,
    },
    /// The configuration file could not be read.
    IoError(String),
    /// The configuration file is not valid JSON for this struct.
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidDieSize(val) => {
                write!(f, "Die size {} is invalid; it must be at least 1", val)
            }
            ConfigError::InvalidBudget(name) => {
                write!(f, "{} budget must be greater than zero", name)
            }
            ConfigError::InvalidThreads(val) => {
                write!(f, "Thread count {} is invalid; it must be at least 1", val)
            }
            ConfigError::DieSizeMismatch { config, game } => write!(
                f,
                "Configured die size {} does not match the game's die size {}",
                config, game
            ),
            ConfigError::IoError(msg) => write!(f, "Failed to read configuration: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BuildConfig::default();
        assert_eq!(config.die_size, 2);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_die_size_rejected() {
        let config = BuildConfig::default().with_die_size(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidDieSize(0)));
    }

    #[test]
    fn test_zero_budgets_rejected() {
        let nodes = BuildConfig::default().with_max_nodes(Some(0));
        assert_eq!(nodes.validate(), Err(ConfigError::InvalidBudget("node")));

        let memory = BuildConfig::default().with_max_memory(Some(0));
        assert_eq!(memory.validate(), Err(ConfigError::InvalidBudget("memory")));

        let threads = BuildConfig::default().with_threads(0);
        assert_eq!(threads.validate(), Err(ConfigError::InvalidThreads(0)));
    }

    #[test]
    fn test_json_loading_fills_defaults() {
        let config = BuildConfig::from_json_str(r#"{ "die_size": 3, "parallel": true }"#)
            .expect("valid config");
        assert_eq!(config.die_size, 3);
        assert!(config.parallel);
        assert_eq!(config.max_nodes, Some(DEFAULT_MAX_NODES));
        assert_eq!(config.max_memory_bytes, None);
    }

    #[test]
    fn test_json_loading_validates() {
        let err = BuildConfig::from_json_str(r#"{ "die_size": 0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidDieSize(0));

        let err = BuildConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unbounded_has_no_limits() {
        let config = BuildConfig::unbounded();
        assert_eq!(config.max_nodes, None);
        assert_eq!(config.max_memory_bytes, None);
    }
}
