//! Recursive construction of decision subtrees.
//!
//! A [`TreeBuilder`] expands one decision node at a time: the terminal action
//! (when legal) becomes a leaf carrying resolved payoffs, and every continuing
//! action recurses into a decision node for the opponent. Every node pushed
//! into the arena is charged to a shared [`NodeBudget`], so a build that would
//! outgrow its limits stops with [`TreeError::ResourceExhaustion`] instead of
//! exhausting host memory.

use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;

use crate::tree::config::BuildConfig;
use crate::tree::error::{Resource, TreeError};
use crate::tree::game::{history_label, Action, Game, Payoffs, Player};
use crate::tree::node::{GameTree, Node, NodeId};

/// Hard ceiling imposed by 32-bit node ids.
pub(crate) const ARENA_LIMIT: u64 = u32::MAX as u64;

/// Node and memory allowance shared by every worker of one build.
#[derive(Debug)]
pub struct NodeBudget {
    max_nodes: u64,
    max_bytes: Option<u64>,
    nodes: AtomicU64,
    bytes: AtomicU64,
}

impl NodeBudget {
    /// Create a budget. `None` leaves a resource unlimited (nodes are still
    /// capped by the id width).
    pub fn new(max_nodes: Option<u64>, max_bytes: Option<u64>) -> Self {
        Self {
            max_nodes: max_nodes.map_or(ARENA_LIMIT, |n| n.min(ARENA_LIMIT)),
            max_bytes,
            nodes: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    /// Budget with no limits beyond the id width.
    pub fn unlimited() -> Self {
        Self::new(None, None)
    }

    /// Budget taken from a build configuration.
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.max_nodes, config.max_memory_bytes)
    }

    /// Charge one node of `bytes` bytes.
    pub fn charge(&self, bytes: u64) -> Result<(), TreeError> {
        let nodes = self.nodes.fetch_add(1, Ordering::Relaxed) + 1;
        if nodes > self.max_nodes {
            warn!("Node budget of {} exhausted", self.max_nodes);
            return Err(TreeError::ResourceExhaustion {
                resource: Resource::Nodes,
                limit: self.max_nodes,
                required: nodes,
            });
        }

        let used = self.bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        if let Some(limit) = self.max_bytes {
            if used > limit {
                warn!("Memory budget of {} bytes exhausted", limit);
                return Err(TreeError::ResourceExhaustion {
                    resource: Resource::MemoryBytes,
                    limit,
                    required: used,
                });
            }
        }

        Ok(())
    }

    /// Nodes charged so far.
    pub fn nodes_used(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    /// Bytes charged so far.
    pub fn bytes_used(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

/// The prior action of a decision node; histories are never empty.
fn prior_action<A: Action>(history: &[A]) -> Result<&A, TreeError> {
    history.last().ok_or_else(|| TreeError::IllegalAction {
        action: "decision".to_string(),
        history: String::new(),
    })
}

/// Where an action taken at a decision node leads.
#[derive(Debug, Clone, PartialEq)]
pub enum Successor<A> {
    /// The game ends with these payoffs.
    Terminal(Payoffs),
    /// The opponent moves next; holds the extended history.
    Decision(Vec<A>),
}

/// Branches of the decision node reached by `history`, in tree order.
///
/// The terminal action comes first when it is legal, followed by every
/// continuing action in ascending order.
pub fn expand_decision<G: Game>(
    game: &G,
    to_move: Player,
    state: &G::State,
    history: &[G::Action],
) -> Result<Vec<(G::Action, Successor<G::Action>)>, TreeError> {
    let prior = prior_action(history)?;
    let options = game.successors(prior);
    let mut branches = Vec::with_capacity(options.len() + 1);

    if let Some(terminal) = game.terminal_action(history) {
        let payoffs = game.resolve(to_move, state, history)?;
        branches.push((terminal, Successor::Terminal(payoffs)));
    }

    for action in options {
        let mut next = Vec::with_capacity(history.len() + 1);
        next.extend_from_slice(history);
        next.push(action.clone());
        branches.push((action, Successor::Decision(next)));
    }

    Ok(branches)
}

/// Builds decision subtrees into a private arena.
pub struct TreeBuilder<'a, G: Game> {
    game: &'a G,
    budget: &'a NodeBudget,
    nodes: Vec<Node<G::State, G::Action>>,
}

impl<'a, G: Game> TreeBuilder<'a, G> {
    /// Create a builder charging its nodes to `budget`.
    pub fn new(game: &'a G, budget: &'a NodeBudget) -> Self {
        Self {
            game,
            budget,
            nodes: Vec::new(),
        }
    }

    /// Build the decision node where `to_move` acts after `history`, with its
    /// whole subtree, and return its id.
    ///
    /// `history` must be non-empty. Recursion depth is bounded by the number
    /// of continuing actions, since each level strictly shrinks the options.
    /// Branch order matches [`expand_decision`].
    pub fn build_decision(
        &mut self,
        to_move: Player,
        state: &G::State,
        mut history: Vec<G::Action>,
    ) -> Result<NodeId, TreeError> {
        self.build_shared(to_move, state, &mut history)
    }

    /// Descends with one history buffer, pushing each action before the
    /// recursive call and popping it after. Only the stored node owns a copy.
    fn build_shared(
        &mut self,
        to_move: Player,
        state: &G::State,
        history: &mut Vec<G::Action>,
    ) -> Result<NodeId, TreeError> {
        let options = self.game.successors(prior_action(history)?);
        let mut branches = Vec::with_capacity(options.len() + 1);

        if let Some(terminal) = self.game.terminal_action(history) {
            let payoffs = self.game.resolve(to_move, state, history)?;
            branches.push((terminal, self.push(Node::Terminal { payoffs })?));
        }

        for action in options {
            history.push(action.clone());
            let child = self.build_shared(to_move.opponent(), state, history);
            history.pop();
            branches.push((action, child?));
        }

        self.push(Node::Decision {
            to_move,
            state: state.clone(),
            history: history.clone(),
            branches,
        })
    }

    /// Nodes built so far, in arena order.
    pub fn nodes(&self) -> &[Node<G::State, G::Action>] {
        &self.nodes
    }

    /// Take the arena.
    pub fn into_nodes(self) -> Vec<Node<G::State, G::Action>> {
        self.nodes
    }

    /// Finish a standalone subtree whose root is the last node built.
    ///
    /// # Errors
    /// Returns [`TreeError::MalformedTree`] if nothing was built.
    pub fn finish(self) -> Result<GameTree<G::State, G::Action>, TreeError> {
        GameTree::from_nodes(self.nodes)
    }

    fn push(&mut self, node: Node<G::State, G::Action>) -> Result<NodeId, TreeError> {
        self.budget.charge(node.footprint())?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        Ok(id)
    }
}

/// Check that `action` is one of the branches offered after `history`.
pub fn check_action<G: Game>(
    game: &G,
    history: &[G::Action],
    action: &G::Action,
) -> Result<(), TreeError> {
    let offered = history
        .last()
        .map(|prior| game.is_legal_successor(prior, action))
        .unwrap_or(false)
        || game.terminal_action(history).as_ref() == Some(action);

    if offered {
        Ok(())
    } else {
        Err(TreeError::IllegalAction {
            action: game.action_name(action),
            history: history_label(history),
        })
    }
}
