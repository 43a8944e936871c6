//! Bidding actions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::game::Action;

/// An action in the bidding game.
///
/// The derived ordering is the betting order: `NoAction` sits below every
/// raise, raises compare lexicographically by `(amount, face)`, and `Call`
/// sits above every raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiceAction {
    /// Sentinel opening every history; never a choice a player can make.
    NoAction,
    /// Claim that at least `amount` dice among all players show `face`.
    Raise {
        /// Minimum number of matching dice claimed.
        amount: u8,
        /// Face value claimed, in `1..=D`.
        face: u8,
    },
    /// Dispute the most recent raise and end the game.
    Call,
}

impl DiceAction {
    /// Shorthand for a raise.
    pub fn raise(amount: u8, face: u8) -> Self {
        DiceAction::Raise { amount, face }
    }

    /// Check if this is a raise.
    pub fn is_raise(&self) -> bool {
        matches!(self, DiceAction::Raise { .. })
    }

    /// Check if this is a call.
    pub fn is_call(&self) -> bool {
        matches!(self, DiceAction::Call)
    }

    /// The `(amount, face)` of a raise.
    pub fn claim(&self) -> Option<(u8, u8)> {
        match self {
            DiceAction::Raise { amount, face } => Some((*amount, *face)),
            _ => None,
        }
    }

    /// Get a short code for this action (for edge labels and info-set keys).
    pub fn short_code(&self) -> String {
        match self {
            DiceAction::NoAction => "-".to_string(),
            DiceAction::Raise { amount, face } => format!("{}x{}", amount, face),
            DiceAction::Call => "C".to_string(),
        }
    }
}

impl Action for DiceAction {
    fn to_string(&self) -> String {
        self.short_code()
    }
}

impl fmt::Display for DiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceAction::NoAction => write!(f, "No action"),
            DiceAction::Raise { amount, face } => write!(f, "Raise {} x {}", amount, face),
            DiceAction::Call => write!(f, "Call"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(DiceAction::NoAction < DiceAction::raise(1, 1));
        assert!(DiceAction::raise(1, 2) < DiceAction::raise(2, 1));
        assert!(DiceAction::raise(2, 1) < DiceAction::raise(2, 2));
        assert!(DiceAction::raise(9, 9) < DiceAction::Call);
    }

    #[test]
    fn test_short_codes() {
        assert_eq!(DiceAction::NoAction.short_code(), "-");
        assert_eq!(DiceAction::raise(10, 12).short_code(), "10x12");
        assert_eq!(DiceAction::Call.short_code(), "C");
        assert_eq!(Action::to_string(&DiceAction::raise(2, 3)), "2x3");
        assert_eq!(format!("{}", DiceAction::raise(2, 3)), "Raise 2 x 3");
    }

    #[test]
    fn test_claim() {
        assert_eq!(DiceAction::raise(2, 4).claim(), Some((2, 4)));
        assert_eq!(DiceAction::Call.claim(), None);
        assert!(DiceAction::Call.is_call());
        assert!(!DiceAction::NoAction.is_raise());
    }
}
