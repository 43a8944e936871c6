//! Private dice rolls and their enumeration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::config::ConfigError;
use crate::tree::error::TreeError;
use crate::tree::game::{ChanceOutcome, GameState, Player};

/// The private state: one die face per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Roll {
    /// `faces[0]` is P1's die, `faces[1]` is P2's die.
    pub faces: [u8; 2],
}

impl GameState for Roll {}

impl Roll {
    /// A roll from P1's and P2's faces.
    pub fn new(p1: u8, p2: u8) -> Self {
        Self { faces: [p1, p2] }
    }

    /// Face shown by `player`'s die.
    pub fn face(&self, player: Player) -> u8 {
        self.faces[player.index()]
    }

    /// Number of dice showing `face`.
    pub fn count(&self, face: u8) -> u8 {
        self.faces.iter().filter(|&&f| f == face).count() as u8
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P1:{} P2:{}", self.faces[0], self.faces[1])
    }
}

/// Enumerates every joint roll.
pub struct RollEnumerator;

impl RollEnumerator {
    /// All `D * D` ordered rolls, each with probability `1 / D^2`.
    ///
    /// P1's face is the outer loop and P2's face the inner loop, so for
    /// `D = 2` the order is `(1,1), (1,2), (2,1), (2,2)`.
    pub fn enumerate(die_size: u8) -> Result<Vec<ChanceOutcome<Roll>>, TreeError> {
        if die_size < 1 {
            return Err(ConfigError::InvalidDieSize(die_size).into());
        }

        let total = die_size as usize * die_size as usize;
        let probability = 1.0 / total as f64;
        let mut outcomes = Vec::with_capacity(total);
        for p1 in 1..=die_size {
            for p2 in 1..=die_size {
                outcomes.push(ChanceOutcome {
                    state: Roll::new(p1, p2),
                    probability,
                });
            }
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_count_and_probability_mass() {
        for die_size in 1..=8u8 {
            let outcomes = RollEnumerator::enumerate(die_size).expect("valid die size");
            assert_eq!(outcomes.len(), die_size as usize * die_size as usize);
            let mass: f64 = outcomes.iter().map(|o| o.probability).sum();
            assert!((mass - 1.0).abs() < 1e-9, "D = {} mass = {}", die_size, mass);
        }
    }

    #[test]
    fn test_enumeration_order_is_stable() {
        let rolls: Vec<Roll> = RollEnumerator::enumerate(2)
            .expect("valid die size")
            .into_iter()
            .map(|o| o.state)
            .collect();
        assert_eq!(
            rolls,
            vec![
                Roll::new(1, 1),
                Roll::new(1, 2),
                Roll::new(2, 1),
                Roll::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_zero_die_size_rejected() {
        let err = RollEnumerator::enumerate(0).unwrap_err();
        assert!(matches!(
            err,
            TreeError::InvalidConfiguration(ConfigError::InvalidDieSize(0))
        ));
    }

    #[test]
    fn test_face_and_count() {
        let roll = Roll::new(3, 3);
        assert_eq!(roll.face(Player::P1), 3);
        assert_eq!(roll.face(Player::P2), 3);
        assert_eq!(roll.count(3), 2);
        assert_eq!(roll.count(4), 0);
        assert_eq!(roll.to_string(), "P1:3 P2:3");
    }
}
