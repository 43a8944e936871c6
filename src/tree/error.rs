//! Errors raised while building or walking a game tree.

use std::fmt;

use crate::tree::config::ConfigError;

/// The resource a build budget limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Number of nodes in the arena.
    Nodes,
    /// Estimated heap footprint of the arena, in bytes.
    MemoryBytes,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Nodes => write!(f, "node"),
            Resource::MemoryBytes => write!(f, "memory"),
        }
    }
}

/// Errors that can occur while building or exploring a tree.
#[derive(Debug, Clone)]
pub enum TreeError {
    /// The build configuration was rejected before any construction started.
    InvalidConfiguration(ConfigError),

    /// An action was applied or resolved where the rules do not allow it.
    ///
    /// The legal-move generator is the only source of actions, so this
    /// signals a bug in the caller rather than a recoverable condition.
    IllegalAction {
        /// Label of the offending action.
        action: String,
        /// Label of the history it was applied to.
        history: String,
    },

    /// The build exceeded the caller-supplied budget.
    ResourceExhaustion {
        /// Which budget ran out.
        resource: Resource,
        /// The configured limit.
        limit: u64,
        /// Amount required when the limit was hit (a lower bound while building).
        required: u64,
    },

    /// The worker pool for a parallel build could not be created.
    ThreadPool(String),

    /// A stored arena breaks the tree invariants (loaded from outside).
    MalformedTree(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::InvalidConfiguration(err) => write!(f, "Invalid configuration: {}", err),
            TreeError::IllegalAction { action, history } => {
                write!(f, "Illegal action {} after history [{}]", action, history)
            }
            TreeError::ResourceExhaustion {
                resource,
                limit,
                required,
            } => write!(
                f,
                "Tree exceeds {} budget: limit {}, required at least {}",
                resource, limit, required
            ),
            TreeError::ThreadPool(msg) => write!(f, "Failed to create thread pool: {}", msg),
            TreeError::MalformedTree(msg) => write!(f, "Malformed tree: {}", msg),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TreeError::InvalidConfiguration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for TreeError {
    fn from(err: ConfigError) -> Self {
        TreeError::InvalidConfiguration(err)
    }
}

impl TreeError {
    /// Whether the error is a budget overrun the caller may retry with a smaller game.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, TreeError::ResourceExhaustion { .. })
    }
}
