//! On-demand expansion of a game tree.
//!
//! Full trees grow combinatorially with the die size, so consumers that only
//! need part of a tree (a single line of play, a sampled playout, a bounded
//! search) can walk it through [`LazyTree`] without materialising anything
//! beyond the nodes they touch.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::tree::builder::{check_action, expand_decision, Successor};
use crate::tree::error::TreeError;
use crate::tree::game::{history_label, ChanceOutcome, Game, Payoffs, Player};

/// A tree node described by its position rather than stored in an arena.
#[derive(Debug, Clone, PartialEq)]
pub enum LazyNode<S, A> {
    /// The chance root.
    Chance,
    /// A decision point.
    Decision {
        /// Player to act.
        to_move: Player,
        /// Private state drawn at the root.
        state: S,
        /// Actions taken so far, including the opening sentinel.
        history: Vec<A>,
    },
    /// A leaf.
    Terminal {
        /// Payoffs for both players.
        payoffs: Payoffs,
    },
}

/// Label of the edge leading to a lazily expanded child.
#[derive(Debug, Clone, PartialEq)]
pub enum Edge<S, A> {
    /// A chance outcome out of the root.
    Outcome(ChanceOutcome<S>),
    /// A player action out of a decision node.
    Action(A),
}

/// One sampled root-to-leaf path.
#[derive(Debug, Clone, PartialEq)]
pub struct Playout<S, A> {
    /// The sampled private state.
    pub state: S,
    /// Every action taken, ending with the terminal action.
    pub history: Vec<A>,
    /// Player who played the terminal action.
    pub caller: Player,
    /// Final payoffs.
    pub payoffs: Payoffs,
}

/// A game tree whose children are produced only when asked for.
#[derive(Debug, Clone)]
pub struct LazyTree<G: Game> {
    game: G,
}

impl<G: Game> LazyTree<G> {
    /// Wrap a game.
    pub fn new(game: G) -> Self {
        Self { game }
    }

    /// The underlying game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The chance root.
    pub fn root(&self) -> LazyNode<G::State, G::Action> {
        LazyNode::Chance
    }

    /// The decision node at the start of play for a given chance outcome.
    pub fn opening(&self, state: G::State) -> LazyNode<G::State, G::Action> {
        LazyNode::Decision {
            to_move: self.game.first_player(),
            state,
            history: self.game.opening_history(),
        }
    }

    /// Children of `node`, in the same order a full build stores them.
    pub fn children(
        &self,
        node: &LazyNode<G::State, G::Action>,
    ) -> Result<Vec<(Edge<G::State, G::Action>, LazyNode<G::State, G::Action>)>, TreeError> {
        match node {
            LazyNode::Chance => Ok(self
                .game
                .chance_outcomes()?
                .into_iter()
                .map(|outcome| {
                    let child = self.opening(outcome.state.clone());
                    (Edge::Outcome(outcome), child)
                })
                .collect()),
            LazyNode::Decision {
                to_move,
                state,
                history,
            } => Ok(expand_decision(&self.game, *to_move, state, history)?
                .into_iter()
                .map(|(action, successor)| {
                    let child = self.successor_node(*to_move, state, successor);
                    (Edge::Action(action), child)
                })
                .collect()),
            LazyNode::Terminal { .. } => Ok(Vec::new()),
        }
    }

    /// The node reached by playing `action` at decision node `node`.
    ///
    /// # Errors
    /// Returns [`TreeError::IllegalAction`] if `node` is not a decision node
    /// or `action` is not among its branches.
    pub fn apply(
        &self,
        node: &LazyNode<G::State, G::Action>,
        action: &G::Action,
    ) -> Result<LazyNode<G::State, G::Action>, TreeError> {
        let LazyNode::Decision {
            to_move,
            state,
            history,
        } = node
        else {
            return Err(TreeError::IllegalAction {
                action: self.game.action_name(action),
                history: "non-decision node".to_string(),
            });
        };

        check_action(&self.game, history, action)?;

        if self.game.terminal_action(history).as_ref() == Some(action) {
            let payoffs = self.game.resolve(*to_move, state, history)?;
            return Ok(LazyNode::Terminal { payoffs });
        }

        let mut next = history.clone();
        next.push(action.clone());
        Ok(LazyNode::Decision {
            to_move: to_move.opponent(),
            state: state.clone(),
            history: next,
        })
    }

    /// Sample one complete line of play: the chance outcome by its
    /// probability, then uniformly random actions until the game ends.
    pub fn playout<R: Rng>(&self, rng: &mut R) -> Result<Playout<G::State, G::Action>, TreeError> {
        let state = self.game.sample_chance(rng)?;
        let mut to_move = self.game.first_player();
        let mut history = self.game.opening_history();

        loop {
            let branches = expand_decision(&self.game, to_move, &state, &history)?;
            let (action, successor) =
                branches
                    .choose(rng)
                    .cloned()
                    .ok_or_else(|| TreeError::IllegalAction {
                        action: "none".to_string(),
                        history: history_label(&history),
                    })?;

            match successor {
                Successor::Terminal(payoffs) => {
                    history.push(action);
                    return Ok(Playout {
                        state,
                        history,
                        caller: to_move,
                        payoffs,
                    });
                }
                Successor::Decision(next) => {
                    history = next;
                    to_move = to_move.opponent();
                }
            }
        }
    }

    fn successor_node(
        &self,
        to_move: Player,
        state: &G::State,
        successor: Successor<G::Action>,
    ) -> LazyNode<G::State, G::Action> {
        match successor {
            Successor::Terminal(payoffs) => LazyNode::Terminal { payoffs },
            Successor::Decision(history) => LazyNode::Decision {
                to_move: to_move.opponent(),
                state: state.clone(),
                history,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::games::dice::{build_game, DiceAction, DiceGame, Roll};
    use crate::tree::node::Node;

    fn lazy(die_size: u8) -> LazyTree<DiceGame> {
        LazyTree::new(DiceGame::new(die_size).expect("valid die size"))
    }

    fn count(tree: &LazyTree<DiceGame>, node: &LazyNode<Roll, DiceAction>) -> u64 {
        let children = tree.children(node).expect("expansion succeeds");
        1 + children
            .iter()
            .map(|(_, child)| count(tree, child))
            .sum::<u64>()
    }

    #[test]
    fn test_lazy_walk_matches_full_build() {
        let tree = lazy(2);
        assert_eq!(count(&tree, &tree.root()), 125);
    }

    #[test]
    fn test_children_order_matches_arena() {
        let lazy_tree = lazy(2);
        let full = build_game(2).expect("build succeeds");

        let lazy_root = lazy_tree.children(&lazy_tree.root()).expect("root expands");
        let Node::Chance { branches } = full.root_node() else {
            panic!("expected chance root");
        };
        assert_eq!(lazy_root.len(), branches.len());

        for ((edge, lazy_child), (outcome, full_child)) in lazy_root.iter().zip(branches) {
            assert_eq!(edge, &Edge::Outcome(outcome.clone()));
            let Some(Node::Decision {
                branches: full_branches,
                ..
            }) = full.node(*full_child)
            else {
                panic!("expected decision child");
            };
            let lazy_actions: Vec<DiceAction> = lazy_tree
                .children(lazy_child)
                .expect("decision expands")
                .into_iter()
                .map(|(edge, _)| match edge {
                    Edge::Action(a) => a,
                    Edge::Outcome(_) => panic!("unexpected chance edge"),
                })
                .collect();
            let full_actions: Vec<DiceAction> = full_branches.iter().map(|(a, _)| *a).collect();
            assert_eq!(lazy_actions, full_actions);
        }
    }

    #[test]
    fn test_apply_legal_and_illegal() {
        let tree = lazy(1);
        let opening = tree.opening(Roll::new(1, 1));

        // Calling an empty history is not allowed.
        assert!(matches!(
            tree.apply(&opening, &DiceAction::Call),
            Err(TreeError::IllegalAction { .. })
        ));

        let after_raise = tree
            .apply(&opening, &DiceAction::raise(1, 1))
            .expect("the only raise is legal");
        match &after_raise {
            LazyNode::Decision {
                to_move, history, ..
            } => {
                assert_eq!(*to_move, Player::P2);
                assert_eq!(history, &vec![DiceAction::NoAction, DiceAction::raise(1, 1)]);
            }
            other => panic!("expected decision, got {:?}", other),
        }

        // Nothing beats the maximal raise; only Call remains.
        assert!(tree.apply(&after_raise, &DiceAction::raise(1, 1)).is_err());
        let end = tree
            .apply(&after_raise, &DiceAction::Call)
            .expect("call is legal");
        // Two ones are showing, so the claim holds and the caller (P2) loses.
        assert_eq!(
            end,
            LazyNode::Terminal {
                payoffs: Payoffs::winner(Player::P1)
            }
        );

        assert!(tree.apply(&end, &DiceAction::Call).is_err());
        assert!(tree.apply(&tree.root(), &DiceAction::Call).is_err());
    }

    #[test]
    fn test_playouts_end_in_valid_terminals() {
        let tree = lazy(3);
        let lattice_max = DiceAction::raise(3, 3);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let playout = tree.playout(&mut rng).expect("playout succeeds");
            assert_eq!(playout.history.first(), Some(&DiceAction::NoAction));
            assert_eq!(playout.history.last(), Some(&DiceAction::Call));

            let raises = &playout.history[1..playout.history.len() - 1];
            assert!(!raises.is_empty());
            assert!(raises.windows(2).all(|w| w[0] < w[1]));
            assert!(raises.iter().all(|r| r.is_raise() && *r <= lattice_max));

            assert_eq!(playout.payoffs.p1 + playout.payoffs.p2, 1.0);
            assert!(playout.payoffs.winning_player().is_some());
        }
    }

    #[test]
    fn test_playouts_are_reproducible() {
        let tree = lazy(2);
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(
                tree.playout(&mut a).expect("playout succeeds"),
                tree.playout(&mut b).expect("playout succeeds")
            );
        }
    }
}
