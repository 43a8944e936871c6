//! Game trait definition for tree construction.
//!
//! Any two-player game with simultaneous private chance draws followed by
//! alternating public actions can be expanded into an extensive-form tree by
//! implementing the `Game` trait. The trait keeps the engine (builder, factory,
//! information-set tagger, lazy expansion) separate from the rules of a
//! specific game.

use std::fmt::{self, Debug};
use std::hash::Hash;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tree::config::{BuildConfig, ConfigError};
use crate::tree::error::TreeError;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// The player who moves first after the chance draw.
    P1,
    /// The second player.
    P2,
}

impl Player {
    /// Both players, in seat order.
    pub const ALL: [Player; 2] = [Player::P1, Player::P2];

    /// The other player. An involution with no fixed points.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }

    /// Zero-based seat index.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::P1 => write!(f, "P1"),
            Player::P2 => write!(f, "P2"),
        }
    }
}

/// Final payoffs at a terminal node.
///
/// Games built by this engine are win/lose and zero-sum in the sense that the
/// two payoffs always add up to exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payoffs {
    /// Payoff for [`Player::P1`].
    pub p1: f64,
    /// Payoff for [`Player::P2`].
    pub p2: f64,
}

impl Payoffs {
    /// Payoffs awarding 1 to `winner` and 0 to the other player.
    pub fn winner(winner: Player) -> Self {
        match winner {
            Player::P1 => Self { p1: 1.0, p2: 0.0 },
            Player::P2 => Self { p1: 0.0, p2: 1.0 },
        }
    }

    /// Payoff for a single player.
    pub fn get(&self, player: Player) -> f64 {
        match player {
            Player::P1 => self.p1,
            Player::P2 => self.p2,
        }
    }

    /// The player holding payoff 1, if any.
    pub fn winning_player(&self) -> Option<Player> {
        Player::ALL.into_iter().find(|&p| self.get(p) == 1.0)
    }
}

/// A chance draw together with the probability it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChanceOutcome<S> {
    /// The private state produced by the draw.
    pub state: S,
    /// Probability of this outcome.
    pub probability: f64,
}

/// Trait for actions that can be taken in a game.
///
/// Actions must be cloneable, comparable, and hashable so they can label tree
/// edges and key information sets.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {
    /// Short label used in edge listings and information-set keys.
    fn to_string(&self) -> String;
}

/// Trait for information states (what a player observes at a decision point).
///
/// Two decision nodes that look identical to the acting player must produce
/// equal information states.
pub trait InfoState: Clone + Eq + Hash + Debug + Send + Sync {
    /// Generate a unique string key for this information state.
    fn key(&self) -> String;
}

/// Trait for the private state produced by the chance draw.
pub trait GameState: Clone + Debug + Send + Sync {}

/// The rules of a game, as needed to expand its extensive-form tree.
///
/// The tree shape is fixed: a single chance root, one decision subtree per
/// chance outcome, and players alternating until the terminal action ends the
/// game.
///
/// # Example
/// ```ignore
/// impl Game for MyGame {
///     type State = MyState;
///     type Action = MyAction;
///     type InfoState = MyInfoState;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// Private state drawn at the chance root.
    type State: GameState;

    /// Actions labelling decision edges.
    type Action: Action;

    /// What the acting player observes.
    type InfoState: InfoState;

    /// Enumerate every chance outcome at the root, in a stable order.
    fn chance_outcomes(&self) -> Result<Vec<ChanceOutcome<Self::State>>, TreeError>;

    /// The player who acts first after the chance draw.
    fn first_player(&self) -> Player {
        Player::P1
    }

    /// History at the first decision node.
    ///
    /// Must be non-empty; the last element is treated as the prior action.
    fn opening_history(&self) -> Vec<Self::Action>;

    /// Continuing actions available after `prior`, in ascending order.
    ///
    /// The terminal action is never included here.
    fn successors(&self, prior: &Self::Action) -> Vec<Self::Action>;

    /// Whether `action` is a continuing action after `prior`.
    fn is_legal_successor(&self, prior: &Self::Action, action: &Self::Action) -> bool {
        self.successors(prior).contains(action)
    }

    /// The game-ending action, if it is legal after `history`.
    fn terminal_action(&self, history: &[Self::Action]) -> Option<Self::Action>;

    /// Payoffs when `caller` plays the terminal action after `history`.
    ///
    /// # Errors
    /// Returns [`TreeError::IllegalAction`] when the terminal action is not
    /// legal after `history`. Reaching that is a bug in the caller.
    fn resolve(
        &self,
        caller: Player,
        state: &Self::State,
        history: &[Self::Action],
    ) -> Result<Payoffs, TreeError>;

    /// What `to_move` observes at the decision node reached by `history`.
    fn info_state(
        &self,
        to_move: Player,
        state: &Self::State,
        history: &[Self::Action],
    ) -> Self::InfoState;

    /// Total number of nodes in the full tree, if known in closed form.
    ///
    /// A count too large for `u64` is reported as `Some(u64::MAX)`; `None`
    /// means the size is unknown and only the running budget applies.
    fn node_count_hint(&self) -> Option<u64> {
        None
    }

    /// Reject a build configuration that describes a different game than
    /// `self`.
    fn check_config(&self, _config: &BuildConfig) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Draw one chance outcome according to its probability.
    fn sample_chance<R: Rng>(&self, rng: &mut R) -> Result<Self::State, TreeError> {
        let outcomes = self.chance_outcomes()?;
        let mut draw: f64 = rng.gen();
        for outcome in &outcomes {
            if draw < outcome.probability {
                return Ok(outcome.state.clone());
            }
            draw -= outcome.probability;
        }
        // Rounding can leave a sliver of mass past the last outcome.
        outcomes
            .last()
            .map(|outcome| outcome.state.clone())
            .ok_or_else(|| TreeError::IllegalAction {
                action: "chance".to_string(),
                history: "no chance outcomes".to_string(),
            })
    }

    /// Get a human-readable name for an action.
    fn action_name(&self, action: &Self::Action) -> String {
        action.to_string()
    }

    /// Get a human-readable description of a state.
    fn state_description(&self, state: &Self::State) -> String {
        format!("{:?}", state)
    }
}

/// Render a history as a comma-separated list of action labels.
pub fn history_label<A: Action>(history: &[A]) -> String {
    history
        .iter()
        .map(Action::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involution() {
        for p in Player::ALL {
            assert_ne!(p.opponent(), p);
            assert_eq!(p.opponent().opponent(), p);
        }
        assert_eq!(Player::P1.index(), 0);
        assert_eq!(Player::P2.index(), 1);
    }

    #[test]
    fn test_winner_payoffs() {
        let p = Payoffs::winner(Player::P2);
        assert_eq!(p.get(Player::P1), 0.0);
        assert_eq!(p.get(Player::P2), 1.0);
        assert_eq!(p.p1 + p.p2, 1.0);
        assert_eq!(p.winning_player(), Some(Player::P2));
    }
}
