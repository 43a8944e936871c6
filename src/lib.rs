//! # Dice Tree
//!
//! Extensive-form game tree construction for a two-player dice bidding game.
//!
//! ## Features
//!
//! - **Generic Engine**: Works with any game implementing the `Game` trait
//! - **Arena Storage**: Immutable trees addressed by `NodeId`
//! - **Budgets**: Node and memory limits fail cleanly with `ResourceExhaustion`
//! - **Parallel Builds**: Chance subtrees built on rayon workers
//! - **Information Sets**: Partition of decision nodes by what the mover observes
//! - **Lazy Expansion**: Walk trees too large to materialize
//!
//! ## Quick Start
//!
//! ```
//! use dice_tree::games::dice::build_game;
//!
//! let tree = build_game(2).unwrap();
//! assert_eq!(tree.node_count(), 125);
//! assert_eq!(tree.max_depth(), 6);
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: Game trait, builder, factory, tagging and diagnostics
//! - [`games`]: Game implementations (the dice bidding game)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    GameTreeFactory (Generic)                    │
//! │  - Budget checks          - Parallel subtree builds             │
//! │  - Arena splicing         - Progress callbacks                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!                        ┌─────────────┐
//!                        │  DiceGame   │
//!                        │ Roll, Bets, │
//!                        │  Payoffs    │
//!                        └─────────────┘
//! ```

#![warn(missing_docs)]

pub mod games;
pub mod tree;

pub use tree::{BuildConfig, Game, GameTree, GameTreeFactory, TreeError};
