//! Extensive-form game tree construction.
//!
//! This module turns the rules of a two-player, private-information bidding
//! game into its complete game tree: a chance root for the private draws,
//! decision nodes where one player chooses among legal actions, and terminal
//! nodes carrying resolved payoffs.
//!
//! # Overview
//!
//! 1. The game enumerates its chance outcomes (one subtree each).
//! 2. [`TreeBuilder`] expands every decision node: the terminal action first
//!    when it is legal, then every strictly greater continuing action.
//! 3. [`GameTreeFactory`] joins the subtrees under a single chance root,
//!    sequentially or on rayon workers, within a node and memory budget.
//! 4. [`InformationSetTagger`] groups decision nodes the acting player cannot
//!    distinguish.
//!
//! Built trees are stored in an index-addressed arena ([`GameTree`]) and are
//! immutable. [`LazyTree`] offers the same structure one node at a time for
//! trees too large to build.
//!
//! # Example
//!
//! ```
//! use dice_tree::games::dice::{build_game, DiceGame};
//! use dice_tree::tree::InformationSetTagger;
//!
//! let tree = build_game(2).unwrap();
//! let stats = tree.stats();
//! assert_eq!(stats.node_count, 125);
//! assert_eq!(stats.max_depth, 6);
//!
//! let game = DiceGame::new(2).unwrap();
//! let info_sets = InformationSetTagger::new(&game).tag(&tree).unwrap();
//! assert_eq!(info_sets.len(), 32);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod factory;
pub mod game;
pub mod info_set;
pub mod lazy;
pub mod node;
pub mod stats;

// Re-export main types for convenient access
pub use builder::{NodeBudget, Successor, TreeBuilder};
pub use config::{BuildConfig, ConfigError};
pub use error::{Resource, TreeError};
pub use factory::{BuildProgress, GameTreeFactory};
pub use game::{Action, ChanceOutcome, Game, GameState, InfoState, Payoffs, Player};
pub use info_set::{InfoSet, InfoSetId, InfoSetPartition, InformationSetTagger};
pub use lazy::{Edge, LazyNode, LazyTree, Playout};
pub use node::{GameTree, Node, NodeId};
pub use stats::TreeStats;
