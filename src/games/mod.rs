//! Game implementations.
//!
//! - [`dice`]: Two-player dice bidding with one private die per player

pub mod dice;
