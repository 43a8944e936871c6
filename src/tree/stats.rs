//! Size and shape diagnostics for built trees.
//!
//! Tree size grows combinatorially with the die size, so these numbers are
//! the first thing to look at before handing a tree to a consumer.

use serde::{Deserialize, Serialize};

use crate::tree::node::{GameTree, Node};

/// Shape statistics of a built tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of nodes.
    pub node_count: u64,
    /// Number of chance nodes.
    pub chance_nodes: u64,
    /// Number of decision nodes.
    pub decision_nodes: u64,
    /// Number of terminal nodes.
    pub terminal_nodes: u64,
    /// Length in edges of the longest root-to-leaf path (the root has depth 0).
    pub max_depth: u32,
    /// Largest number of branches at any node.
    pub max_branching: usize,
    /// Approximate heap plus inline footprint of the arena, in bytes.
    pub estimated_bytes: u64,
    /// Time spent building, in seconds, when measured by the caller.
    pub elapsed_seconds: f64,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how long the build took.
    pub fn with_elapsed(mut self, elapsed_seconds: f64) -> Self {
        self.elapsed_seconds = elapsed_seconds;
        self
    }

    /// Estimated footprint in human-readable form.
    pub fn memory_str(&self) -> String {
        format_bytes(self.estimated_bytes)
    }
}

impl<S, A> GameTree<S, A> {
    /// Collect shape statistics in a single pass over the arena.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::new();
        stats.node_count = self.len() as u64;
        stats.max_depth = self.max_depth();

        for (_, node) in self.iter() {
            match node {
                Node::Terminal { .. } => stats.terminal_nodes += 1,
                Node::Chance { .. } => stats.chance_nodes += 1,
                Node::Decision { .. } => stats.decision_nodes += 1,
            }
            stats.max_branching = stats.max_branching.max(node.num_children());
            stats.estimated_bytes += node.footprint();
        }

        stats
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> u64 {
        self.len() as u64
    }

    /// Length in edges of the longest root-to-leaf path.
    pub fn max_depth(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }

        // Parents sit after their children, so a backwards sweep sees every
        // parent's depth before any of its children.
        let mut depth = vec![0u32; self.len()];
        let mut deepest = 0;
        for (index, node) in self.nodes().iter().enumerate().rev() {
            let d = depth[index];
            deepest = deepest.max(d);
            for child in node.child_ids() {
                depth[child.index()] = d + 1;
            }
        }
        deepest
    }
}

/// Format bytes in human-readable form.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
