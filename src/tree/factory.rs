//! Top-level construction of complete, chance-rooted game trees.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::tree::builder::{NodeBudget, TreeBuilder, ARENA_LIMIT};
use crate::tree::config::BuildConfig;
use crate::tree::error::{Resource, TreeError};
use crate::tree::game::{ChanceOutcome, Game};
use crate::tree::node::{GameTree, Node, NodeId};

/// Progress report passed to build callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    /// Chance subtrees finished so far.
    pub completed: usize,
    /// Total number of chance subtrees.
    pub total: usize,
    /// Nodes charged to the budget so far, across all workers.
    pub nodes: u64,
    /// Estimated bytes charged so far, across all workers.
    pub bytes: u64,
}

/// Builds the full tree of a game: one chance root with a decision subtree
/// per chance outcome.
///
/// Subtrees under distinct chance outcomes are independent, so with
/// `parallel` enabled they are built on rayon workers. Each worker fills a
/// private arena; the arenas are spliced in outcome order, which makes the
/// result identical to a sequential build.
///
/// # Example
/// ```
/// use dice_tree::games::dice::DiceGame;
/// use dice_tree::tree::{BuildConfig, GameTreeFactory};
///
/// let game = DiceGame::new(2).unwrap();
/// let tree = GameTreeFactory::new(game, BuildConfig::default()).build().unwrap();
/// assert_eq!(tree.len(), 125);
/// ```
pub struct GameTreeFactory<G: Game> {
    game: G,
    config: BuildConfig,
}

impl<G: Game> GameTreeFactory<G> {
    /// Create a factory for `game` with the budgets and parallelism in `config`.
    pub fn new(game: G, config: BuildConfig) -> Self {
        Self { game, config }
    }

    /// The game being expanded.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The build configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the complete tree.
    pub fn build(&self) -> Result<GameTree<G::State, G::Action>, TreeError> {
        self.build_with_callback(|_| {})
    }

    /// Build the complete tree, calling `callback` after each chance subtree.
    ///
    /// With a parallel build the callback runs on worker threads, in
    /// completion order.
    pub fn build_with_callback<F>(
        &self,
        callback: F,
    ) -> Result<GameTree<G::State, G::Action>, TreeError>
    where
        F: Fn(&BuildProgress) + Sync,
    {
        self.config.validate()?;
        self.game.check_config(&self.config)?;
        self.check_node_count_hint()?;

        let start_time = Instant::now();
        let outcomes = self.game.chance_outcomes()?;
        let total = outcomes.len();
        let budget = NodeBudget::from_config(&self.config);
        let completed = AtomicUsize::new(0);

        info!(
            "Building tree over {} chance outcomes ({})",
            total,
            if self.config.parallel { "parallel" } else { "sequential" }
        );

        let build_subtree = |outcome: &ChanceOutcome<G::State>| -> Result<
            Vec<Node<G::State, G::Action>>,
            TreeError,
        > {
            let mut builder = TreeBuilder::new(&self.game, &budget);
            builder.build_decision(
                self.game.first_player(),
                &outcome.state,
                self.game.opening_history(),
            )?;

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                "Subtree {}/{} for {} has {} nodes",
                done,
                total,
                self.game.state_description(&outcome.state),
                builder.nodes().len()
            );
            callback(&BuildProgress {
                completed: done,
                total,
                nodes: budget.nodes_used(),
                bytes: budget.bytes_used(),
            });

            Ok(builder.into_nodes())
        };

        let subtrees = if self.config.parallel {
            self.run_parallel(|| {
                outcomes
                    .par_iter()
                    .map(&build_subtree)
                    .collect::<Result<Vec<_>, TreeError>>()
            })?
        } else {
            outcomes
                .iter()
                .map(&build_subtree)
                .collect::<Result<Vec<_>, TreeError>>()?
        };

        let mut nodes = Vec::with_capacity(subtrees.iter().map(Vec::len).sum::<usize>() + 1);
        let mut branches = Vec::with_capacity(total);

        for (outcome, subtree) in outcomes.into_iter().zip(subtrees) {
            let offset = nodes.len() as u32;
            let root = NodeId(offset + subtree.len().saturating_sub(1) as u32);
            nodes.extend(subtree.into_iter().map(|mut node| {
                node.shift(offset);
                node
            }));
            branches.push((outcome, root));
        }

        let root = Node::Chance { branches };
        budget.charge(root.footprint())?;
        nodes.push(root);

        info!(
            "Built tree with {} nodes (~{} bytes) in {:.2}s",
            nodes.len(),
            budget.bytes_used(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(GameTree::from_arena(nodes))
    }

    /// Fail before any allocation when the closed-form size already exceeds
    /// the node budget, the id width, or the memory budget at the smallest
    /// possible node size.
    fn check_node_count_hint(&self) -> Result<(), TreeError> {
        let Some(required) = self.game.node_count_hint() else {
            return Ok(());
        };

        let limit = self.config.max_nodes.map_or(ARENA_LIMIT, |n| n.min(ARENA_LIMIT));
        if required > limit {
            warn!("Tree needs {} nodes, over the budget of {}", required, limit);
            return Err(TreeError::ResourceExhaustion {
                resource: Resource::Nodes,
                limit,
                required,
            });
        }

        if let Some(limit) = self.config.max_memory_bytes {
            let required =
                required.saturating_mul(Node::<G::State, G::Action>::min_footprint());
            if required > limit {
                warn!("Tree needs at least {} bytes, over the budget of {}", required, limit);
                return Err(TreeError::ResourceExhaustion {
                    resource: Resource::MemoryBytes,
                    limit,
                    required,
                });
            }
        }
        Ok(())
    }

    fn run_parallel<R, OP>(&self, op: OP) -> Result<R, TreeError>
    where
        OP: FnOnce() -> Result<R, TreeError> + Send,
        R: Send,
    {
        match self.config.num_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| TreeError::ThreadPool(e.to_string()))?;
                pool.install(op)
            }
            None => op(),
        }
    }
}
