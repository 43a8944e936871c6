//! Payoff resolution when a raise is called.

use crate::tree::error::TreeError;
use crate::tree::game::{Payoffs, Player};

use super::action::DiceAction;
use super::roll::Roll;

/// Decides who wins when a raise is called.
pub struct PayoffResolver;

impl PayoffResolver {
    /// Whether the claim "at least `amount` dice show `face`" holds for `roll`.
    pub fn is_valid_claim(roll: &Roll, amount: u8, face: u8) -> bool {
        roll.count(face) >= amount
    }

    /// Payoffs after `calling_player` calls `called`.
    ///
    /// A valid claim means the caller was wrong to dispute it and loses;
    /// an invalid claim means the caller wins. The winner gets 1, the loser 0.
    ///
    /// # Errors
    /// Returns [`TreeError::IllegalAction`] if `called` is not a raise.
    pub fn resolve(
        calling_player: Player,
        roll: &Roll,
        called: &DiceAction,
    ) -> Result<Payoffs, TreeError> {
        let (amount, face) = called.claim().ok_or_else(|| TreeError::IllegalAction {
            action: DiceAction::Call.short_code(),
            history: called.short_code(),
        })?;

        let winner = if Self::is_valid_claim(roll, amount, face) {
            calling_player.opponent()
        } else {
            calling_player
        };
        Ok(Payoffs::winner(winner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_claim_loses_for_caller() {
        // Two dice show 3, so "at least two 3s" holds.
        let roll = Roll::new(3, 3);
        let payoffs =
            PayoffResolver::resolve(Player::P1, &roll, &DiceAction::raise(2, 3)).expect("raise");
        assert_eq!(payoffs, Payoffs::winner(Player::P2));
        assert_eq!(payoffs.p1, 0.0);
        assert_eq!(payoffs.p2, 1.0);
    }

    #[test]
    fn test_invalid_claim_wins_for_caller() {
        // No die shows 4.
        let roll = Roll::new(3, 3);
        let payoffs =
            PayoffResolver::resolve(Player::P1, &roll, &DiceAction::raise(2, 4)).expect("raise");
        assert_eq!(payoffs, Payoffs::winner(Player::P1));

        let payoffs =
            PayoffResolver::resolve(Player::P2, &roll, &DiceAction::raise(2, 4)).expect("raise");
        assert_eq!(payoffs, Payoffs::winner(Player::P2));
    }

    #[test]
    fn test_partial_match() {
        let roll = Roll::new(1, 2);
        assert!(PayoffResolver::is_valid_claim(&roll, 1, 2));
        assert!(!PayoffResolver::is_valid_claim(&roll, 2, 2));
    }

    #[test]
    fn test_payoffs_always_sum_to_one() {
        for p1 in 1..=4u8 {
            for p2 in 1..=4u8 {
                let roll = Roll::new(p1, p2);
                for amount in 1..=4u8 {
                    for face in 1..=4u8 {
                        for caller in Player::ALL {
                            let payoffs = PayoffResolver::resolve(
                                caller,
                                &roll,
                                &DiceAction::raise(amount, face),
                            )
                            .expect("raise");
                            assert_eq!(payoffs.p1 + payoffs.p2, 1.0);
                            assert!(payoffs.winning_player().is_some());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_calling_non_raise_is_illegal() {
        let roll = Roll::new(1, 1);
        for action in [DiceAction::NoAction, DiceAction::Call] {
            assert!(matches!(
                PayoffResolver::resolve(Player::P1, &roll, &action),
                Err(TreeError::IllegalAction { .. })
            ));
        }
    }
}
