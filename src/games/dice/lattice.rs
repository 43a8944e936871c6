//! The betting order and legal-move generation.
//!
//! Raises form the cross product `amount in 1..=D`, `face in 1..=D`, totally
//! ordered by `(amount, face)`. A player may only raise strictly above the
//! previous raise, and may call once at least one raise has been made.

use crate::tree::config::ConfigError;
use crate::tree::error::TreeError;

use super::action::DiceAction;

/// Legal-move generator for one die size.
///
/// Holds the ascending list of all `D * D` raises, computed once per lattice
/// from the closed-form order, so successor queries are a binary search and
/// a slice copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetLattice {
    die_size: u8,
    raises: Vec<DiceAction>,
}

impl BetLattice {
    /// Build the lattice for dice with `die_size` faces.
    pub fn new(die_size: u8) -> Result<Self, TreeError> {
        if die_size < 1 {
            return Err(ConfigError::InvalidDieSize(die_size).into());
        }

        let raises = (1..=die_size)
            .flat_map(|amount| (1..=die_size).map(move |face| DiceAction::raise(amount, face)))
            .collect();

        Ok(Self { die_size, raises })
    }

    /// Number of faces per die.
    pub fn die_size(&self) -> u8 {
        self.die_size
    }

    /// Every raise, in ascending order.
    pub fn raises(&self) -> &[DiceAction] {
        &self.raises
    }

    /// Number of distinct raises (`D * D`).
    pub fn len(&self) -> usize {
        self.raises.len()
    }

    /// Always false; a lattice has at least the raise `1 x 1`.
    pub fn is_empty(&self) -> bool {
        self.raises.is_empty()
    }

    /// The largest raise, `D x D`.
    pub fn max_raise(&self) -> DiceAction {
        DiceAction::raise(self.die_size, self.die_size)
    }

    /// Position of `action` in the ascending order of raises.
    pub fn rank(&self, action: &DiceAction) -> Option<usize> {
        let (amount, face) = action.claim()?;
        if !(1..=self.die_size).contains(&amount) || !(1..=self.die_size).contains(&face) {
            return None;
        }
        Some((amount as usize - 1) * self.die_size as usize + (face as usize - 1))
    }

    /// Whether `action` is a raise within this lattice.
    pub fn contains(&self, action: &DiceAction) -> bool {
        self.rank(action).is_some()
    }

    /// Every raise strictly greater than `prior`, in ascending order.
    ///
    /// After `NoAction` that is every raise; after the maximal raise it is
    /// empty, leaving the opponent nothing but `Call`. `Call` never appears.
    pub fn legal_successors(&self, prior: &DiceAction) -> Vec<DiceAction> {
        let start = self.raises.partition_point(|raise| raise <= prior);
        self.raises[start..].to_vec()
    }

    /// Whether `action` may follow `prior` as a raise.
    pub fn is_legal_successor(&self, prior: &DiceAction, action: &DiceAction) -> bool {
        self.contains(action) && action > prior
    }

    /// `Call` is legal once the history holds at least one raise.
    pub fn is_call_legal(history: &[DiceAction]) -> bool {
        history.iter().any(DiceAction::is_raise)
    }
}
