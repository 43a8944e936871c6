//! Two-player dice bidding game.
//!
//! Each player secretly rolls one die with `D` faces. Starting with P1, the
//! players alternate raising a claim about all dice on the table, and a
//! player may instead call the previous raise to end the game.
//!
//! ## Game Rules
//!
//! - Both players roll one `D`-sided die simultaneously and privately
//! - A raise `amount x face` claims at least `amount` dice show `face`
//! - Each raise must be strictly greater than the last, ordered by `(amount, face)`
//! - Call ends the game; the caller wins if the called claim is false
//! - The winner scores 1, the loser 0
//!
//! ## Game Tree (D = 1)
//!
//! ```text
//! Chance (roll 1/1, p = 1)
//! └── P1 [-]
//!     └── Raise 1x1
//!         └── P2 [-,1x1]
//!             └── Call → P1 wins (one or more 1s showing)
//! ```
//!
//! ## Tree Size
//!
//! With `R = D * D` raises the tree has `1 + R * (2^(R+1) - 1)` nodes:
//! 125 for `D = 2`, 9,208 for `D = 3`, 2,097,137 for `D = 4`.

pub mod action;
pub mod lattice;
pub mod payoff;
pub mod roll;

use std::fmt;

pub use action::DiceAction;
pub use lattice::BetLattice;
pub use payoff::PayoffResolver;
pub use roll::{Roll, RollEnumerator};

use crate::tree::config::{BuildConfig, ConfigError};
use crate::tree::error::TreeError;
use crate::tree::factory::GameTreeFactory;
use crate::tree::game::{history_label, ChanceOutcome, Game, InfoState, Payoffs, Player};
use crate::tree::node::GameTree;

/// A fully built dice game tree.
pub type DiceTree = GameTree<Roll, DiceAction>;

/// Information state in the dice game.
///
/// What a player knows: their own die and the public bidding history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiceInfoState {
    /// The acting player.
    pub player: Player,
    /// The acting player's own face.
    pub face: u8,
    /// Public action history.
    pub history: Vec<DiceAction>,
}

impl InfoState for DiceInfoState {
    fn key(&self) -> String {
        let history: Vec<String> = self.history.iter().map(DiceAction::short_code).collect();
        format!("{}:{}|{}", self.player, self.face, history.join(","))
    }
}

impl fmt::Display for DiceInfoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The dice bidding game for a fixed die size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceGame {
    lattice: BetLattice,
}

impl DiceGame {
    /// Create the game for dice with `die_size` faces.
    pub fn new(die_size: u8) -> Result<Self, TreeError> {
        Ok(Self {
            lattice: BetLattice::new(die_size)?,
        })
    }

    /// Number of faces per die.
    pub fn die_size(&self) -> u8 {
        self.lattice.die_size()
    }

    /// The legal-move generator.
    pub fn lattice(&self) -> &BetLattice {
        &self.lattice
    }

    /// Number of nodes in the full tree for `die_size`, or `None` if it does
    /// not fit in a `u64`.
    pub fn predicted_node_count(die_size: u8) -> Option<u64> {
        let raises = die_size as u64 * die_size as u64;
        let subtree = 1u64
            .checked_shl(u32::try_from(raises + 1).ok()?)?
            .checked_sub(1)?;
        raises.checked_mul(subtree)?.checked_add(1)
    }

    /// Number of decision nodes in the full tree for `die_size`.
    pub fn predicted_decision_count(die_size: u8) -> Option<u64> {
        let raises = die_size as u64 * die_size as u64;
        raises.checked_mul(1u64.checked_shl(u32::try_from(raises).ok()?)?)
    }

    /// Longest root-to-leaf path, in edges: the opening move, every raise in
    /// turn, then the call.
    pub fn predicted_max_depth(die_size: u8) -> u32 {
        die_size as u32 * die_size as u32 + 2
    }
}

impl Game for DiceGame {
    type State = Roll;
    type Action = DiceAction;
    type InfoState = DiceInfoState;

    fn chance_outcomes(&self) -> Result<Vec<ChanceOutcome<Roll>>, TreeError> {
        RollEnumerator::enumerate(self.die_size())
    }

    fn opening_history(&self) -> Vec<DiceAction> {
        vec![DiceAction::NoAction]
    }

    fn successors(&self, prior: &DiceAction) -> Vec<DiceAction> {
        self.lattice.legal_successors(prior)
    }

    fn is_legal_successor(&self, prior: &DiceAction, action: &DiceAction) -> bool {
        self.lattice.is_legal_successor(prior, action)
    }

    fn terminal_action(&self, history: &[DiceAction]) -> Option<DiceAction> {
        BetLattice::is_call_legal(history).then_some(DiceAction::Call)
    }

    fn resolve(
        &self,
        caller: Player,
        state: &Roll,
        history: &[DiceAction],
    ) -> Result<Payoffs, TreeError> {
        match history.last() {
            Some(prior) if BetLattice::is_call_legal(history) => {
                PayoffResolver::resolve(caller, state, prior)
            }
            _ => Err(TreeError::IllegalAction {
                action: DiceAction::Call.short_code(),
                history: history_label(history),
            }),
        }
    }

    fn info_state(&self, to_move: Player, state: &Roll, history: &[DiceAction]) -> DiceInfoState {
        DiceInfoState {
            player: to_move,
            face: state.face(to_move),
            history: history.to_vec(),
        }
    }

    fn node_count_hint(&self) -> Option<u64> {
        Some(Self::predicted_node_count(self.die_size()).unwrap_or(u64::MAX))
    }

    fn check_config(&self, config: &BuildConfig) -> Result<(), ConfigError> {
        if config.die_size != self.die_size() {
            return Err(ConfigError::DieSizeMismatch {
                config: config.die_size,
                game: self.die_size(),
            });
        }
        Ok(())
    }

    fn action_name(&self, action: &DiceAction) -> String {
        format!("{}", action)
    }

    fn state_description(&self, state: &Roll) -> String {
        format!("{}", state)
    }
}

/// Build the full tree for `die_size` with the default budget.
pub fn build_game(die_size: u8) -> Result<DiceTree, TreeError> {
    build_game_with_config(&BuildConfig::default().with_die_size(die_size))
}

/// Build the full tree described by `config`.
pub fn build_game_with_config(config: &BuildConfig) -> Result<DiceTree, TreeError> {
    config.validate()?;
    let game = DiceGame::new(config.die_size)?;
    GameTreeFactory::new(game, config.clone()).build()
}
