//! Arena storage for built game trees.
//!
//! Nodes live in a single `Vec` and refer to their children by [`NodeId`].
//! Children are always stored before their parent, so the root is the last
//! node of the arena and every branch points backwards.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::tree::error::TreeError;
use crate::tree::game::{ChanceOutcome, Payoffs, Player};

/// Index of a node inside a [`GameTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of an extensive-form game tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node<S, A> {
    /// Leaf carrying the final payoffs.
    Terminal {
        /// Payoffs for both players.
        payoffs: Payoffs,
    },

    /// Random event; only ever the root.
    Chance {
        /// One branch per chance outcome, in enumeration order.
        branches: Vec<(ChanceOutcome<S>, NodeId)>,
    },

    /// A player chooses among `branches`.
    Decision {
        /// Player to act.
        to_move: Player,
        /// Private state drawn at the root.
        state: S,
        /// Actions taken so far, including the opening sentinel.
        history: Vec<A>,
        /// Available actions and the node each leads to.
        branches: Vec<(A, NodeId)>,
    },
}

impl<S, A> Node<S, A> {
    /// Check if this is a terminal node.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal { .. })
    }

    /// Check if this is a chance node.
    pub fn is_chance(&self) -> bool {
        matches!(self, Node::Chance { .. })
    }

    /// Check if this is a decision node.
    pub fn is_decision(&self) -> bool {
        matches!(self, Node::Decision { .. })
    }

    /// Ids of all children, in branch order.
    pub fn child_ids(&self) -> Vec<NodeId> {
        match self {
            Node::Terminal { .. } => Vec::new(),
            Node::Chance { branches } => branches.iter().map(|(_, id)| *id).collect(),
            Node::Decision { branches, .. } => branches.iter().map(|(_, id)| *id).collect(),
        }
    }

    /// Number of children.
    pub fn num_children(&self) -> usize {
        match self {
            Node::Terminal { .. } => 0,
            Node::Chance { branches } => branches.len(),
            Node::Decision { branches, .. } => branches.len(),
        }
    }

    /// Smallest footprint any node can have: a leaf with no heap data.
    pub fn min_footprint() -> u64 {
        mem::size_of::<Self>() as u64
    }

    /// Approximate heap plus inline size of this node, in bytes.
    pub fn footprint(&self) -> u64 {
        let heap = match self {
            Node::Terminal { .. } => 0,
            Node::Chance { branches } => {
                branches.capacity() * mem::size_of::<(ChanceOutcome<S>, NodeId)>()
            }
            Node::Decision {
                history, branches, ..
            } => {
                history.capacity() * mem::size_of::<A>()
                    + branches.capacity() * mem::size_of::<(A, NodeId)>()
            }
        };
        (mem::size_of::<Self>() + heap) as u64
    }

    /// Move every child reference forward by `offset` slots.
    ///
    /// Used when a subtree built in its own arena is appended to another.
    pub(crate) fn shift(&mut self, offset: u32) {
        match self {
            Node::Terminal { .. } => {}
            Node::Chance { branches } => {
                for (_, id) in branches.iter_mut() {
                    id.0 += offset;
                }
            }
            Node::Decision { branches, .. } => {
                for (_, id) in branches.iter_mut() {
                    id.0 += offset;
                }
            }
        }
    }
}

/// An immutable, fully built game tree.
///
/// The tree owns its nodes exclusively and is never mutated after
/// construction, so it can be shared between readers freely.
///
/// Deserialization goes through [`GameTree::from_nodes`], so a loaded tree
/// satisfies the same arena invariants as a built one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "ArenaData<S, A>",
    bound(deserialize = "S: Deserialize<'de>, A: Deserialize<'de>")
)]
pub struct GameTree<S, A> {
    nodes: Vec<Node<S, A>>,
    root: NodeId,
}

/// Serialized shape of a [`GameTree`], checked before it becomes one.
#[derive(Deserialize)]
struct ArenaData<S, A> {
    nodes: Vec<Node<S, A>>,
    root: NodeId,
}

impl<S, A> TryFrom<ArenaData<S, A>> for GameTree<S, A> {
    type Error = TreeError;

    fn try_from(data: ArenaData<S, A>) -> Result<Self, TreeError> {
        let expected = data.nodes.len().checked_sub(1);
        if expected != Some(data.root.index()) {
            return Err(TreeError::MalformedTree(format!(
                "root {} is not the last of {} nodes",
                data.root.0,
                data.nodes.len()
            )));
        }
        Self::from_nodes(data.nodes)
    }
}

impl<S, A> GameTree<S, A> {
    /// Wrap an arena the factory has just spliced, whose last node is the root.
    pub(crate) fn from_arena(nodes: Vec<Node<S, A>>) -> Self {
        let root = NodeId(nodes.len().saturating_sub(1) as u32);
        Self { nodes, root }
    }

    /// Wrap an arena after checking it: non-empty, addressable by `u32`, and
    /// every child stored before its parent.
    ///
    /// # Errors
    /// Returns [`TreeError::MalformedTree`] naming the first violation.
    pub fn from_nodes(nodes: Vec<Node<S, A>>) -> Result<Self, TreeError> {
        if nodes.is_empty() {
            return Err(TreeError::MalformedTree("empty arena".to_string()));
        }
        if nodes.len() as u64 > u32::MAX as u64 {
            return Err(TreeError::MalformedTree(format!(
                "{} nodes exceed 32-bit ids",
                nodes.len()
            )));
        }
        for (index, node) in nodes.iter().enumerate() {
            if let Some(child) = node.child_ids().into_iter().find(|c| c.index() >= index) {
                return Err(TreeError::MalformedTree(format!(
                    "node {} points forward to {}",
                    index, child.0
                )));
            }
        }
        Ok(Self::from_arena(nodes))
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root node.
    pub fn root_node(&self) -> &Node<S, A> {
        &self.nodes[self.root.index()]
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node<S, A>> {
        self.nodes.get(id.index())
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the children of `id`, in branch order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).map(Node::child_ids).unwrap_or_default()
    }

    /// Iterate over all nodes with their ids, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<S, A>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// All nodes as a slice, in arena order.
    pub fn nodes(&self) -> &[Node<S, A>] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::dice::{build_game, DiceTree};

    type TestNode = Node<u8, u8>;

    #[test]
    fn test_root_is_last_node() {
        let nodes: Vec<TestNode> = vec![
            Node::Terminal {
                payoffs: Payoffs::winner(Player::P1),
            },
            Node::Decision {
                to_move: Player::P2,
                state: 0,
                history: vec![0],
                branches: vec![(1, NodeId(0))],
            },
        ];
        let tree = GameTree::from_nodes(nodes).expect("valid arena");
        assert_eq!(tree.root(), NodeId(1));
        assert!(tree.root_node().is_decision());
        assert_eq!(tree.children(tree.root()), vec![NodeId(0)]);
        assert!(tree.children(NodeId(0)).is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_from_nodes_rejects_bad_arenas() {
        let empty: Vec<TestNode> = Vec::new();
        assert!(matches!(
            GameTree::from_nodes(empty),
            Err(TreeError::MalformedTree(_))
        ));

        // The child would be stored after its parent.
        let forward: Vec<TestNode> = vec![
            Node::Decision {
                to_move: Player::P1,
                state: 0,
                history: vec![0],
                branches: vec![(1, NodeId(1))],
            },
            Node::Terminal {
                payoffs: Payoffs::winner(Player::P1),
            },
        ];
        assert!(GameTree::from_nodes(forward).is_err());

        let self_loop: Vec<TestNode> = vec![Node::Decision {
            to_move: Player::P1,
            state: 0,
            history: vec![0],
            branches: vec![(1, NodeId(0))],
        }];
        assert!(GameTree::from_nodes(self_loop).is_err());
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        for die_size in 1..=3u8 {
            let tree = build_game(die_size).expect("build succeeds");
            let json = serde_json::to_string(&tree).expect("serializes");
            let loaded: DiceTree = serde_json::from_str(&json).expect("deserializes");
            assert_eq!(loaded, tree, "D = {}", die_size);
        }
    }

    #[test]
    fn test_deserialize_rejects_malformed_trees() {
        let empty = r#"{"nodes":[],"root":0}"#;
        assert!(serde_json::from_str::<GameTree<u8, u8>>(empty).is_err());

        let leaf = r#"{"Terminal":{"payoffs":{"p1":1.0,"p2":0.0}}}"#;
        let wrong_root = format!(r#"{{"nodes":[{},{}],"root":0}}"#, leaf, leaf);
        assert!(serde_json::from_str::<GameTree<u8, u8>>(&wrong_root).is_err());

        let dangling = r#"{"nodes":[{"Chance":{"branches":[[{"state":1,"probability":1.0},7]]}}],"root":0}"#;
        assert!(serde_json::from_str::<GameTree<u8, u8>>(dangling).is_err());

        let single = format!(r#"{{"nodes":[{}],"root":0}}"#, leaf);
        let tree: GameTree<u8, u8> = serde_json::from_str(&single).expect("a lone leaf is valid");
        assert_eq!(tree.max_depth(), 0);
    }

    #[test]
    fn test_shift_moves_child_ids() {
        let mut node: TestNode = Node::Decision {
            to_move: Player::P1,
            state: 0,
            history: vec![0],
            branches: vec![(1, NodeId(0)), (2, NodeId(3))],
        };
        node.shift(10);
        assert_eq!(node.child_ids(), vec![NodeId(10), NodeId(13)]);
    }

    #[test]
    fn test_footprint_counts_heap() {
        let leaf: TestNode = Node::Terminal {
            payoffs: Payoffs::winner(Player::P2),
        };
        let inner: TestNode = Node::Decision {
            to_move: Player::P1,
            state: 0,
            history: vec![0, 1, 2],
            branches: vec![(3, NodeId(0))],
        };
        assert!(inner.footprint() > leaf.footprint());
    }
}
