//! Information-set tagging.
//!
//! An information set groups the decision nodes the acting player cannot
//! tell apart: same player to move, same public history, same private
//! observation, differing only in what the opponent drew. Tagging runs as a
//! separate pass over an already built tree.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::tree::error::TreeError;
use crate::tree::game::{history_label, Action, Game, InfoState, Player};
use crate::tree::node::{GameTree, Node, NodeId};

/// Stable identifier of an information set within one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InfoSetId(pub u32);

/// One information set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoSet<A> {
    /// Identifier, assigned in arena order of the first member.
    pub id: InfoSetId,
    /// Key of the shared information state.
    pub key: String,
    /// Player acting at every member.
    pub player: Player,
    /// Actions available at every member, in branch order.
    pub actions: Vec<A>,
    /// Decision nodes belonging to the set, in arena order.
    pub members: Vec<NodeId>,
}

/// Partition of all decision nodes of a tree into information sets.
#[derive(Debug, Clone, Serialize)]
pub struct InfoSetPartition<A> {
    sets: Vec<InfoSet<A>>,
    #[serde(skip)]
    by_node: FxHashMap<NodeId, InfoSetId>,
}

impl<A> InfoSetPartition<A> {
    /// All information sets, ordered by id.
    pub fn sets(&self) -> &[InfoSet<A>] {
        &self.sets
    }

    /// Number of information sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the tree had no decision nodes.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Look up an information set by id.
    pub fn get(&self, id: InfoSetId) -> Option<&InfoSet<A>> {
        self.sets.get(id.0 as usize)
    }

    /// Information set containing decision node `node`.
    pub fn info_set_of(&self, node: NodeId) -> Option<InfoSetId> {
        self.by_node.get(&node).copied()
    }

    /// Information sets where `player` acts.
    pub fn for_player(&self, player: Player) -> impl Iterator<Item = &InfoSet<A>> {
        self.sets.iter().filter(move |set| set.player == player)
    }
}

/// Groups the decision nodes of a built tree into information sets.
pub struct InformationSetTagger<'a, G: Game> {
    game: &'a G,
}

impl<'a, G: Game> InformationSetTagger<'a, G> {
    /// Create a tagger using `game`'s notion of observability.
    pub fn new(game: &'a G) -> Self {
        Self { game }
    }

    /// Partition every decision node of `tree`.
    ///
    /// # Errors
    /// Returns [`TreeError::IllegalAction`] if two members of one set offer
    /// different actions, which means the game's information states leak
    /// less than its move generator depends on.
    pub fn tag(
        &self,
        tree: &GameTree<G::State, G::Action>,
    ) -> Result<InfoSetPartition<G::Action>, TreeError> {
        let mut ids: FxHashMap<G::InfoState, InfoSetId> = FxHashMap::default();
        let mut sets: Vec<InfoSet<G::Action>> = Vec::new();
        let mut by_node = FxHashMap::default();

        for (node_id, node) in tree.iter() {
            let Node::Decision {
                to_move,
                state,
                history,
                branches,
            } = node
            else {
                continue;
            };

            let info = self.game.info_state(*to_move, state, history);
            let actions = branches.iter().map(|(action, _)| action);

            let id = match ids.get(&info) {
                Some(&id) => {
                    let set = &mut sets[id.0 as usize];
                    if !set.actions.iter().eq(actions.clone()) {
                        return Err(TreeError::IllegalAction {
                            action: branches
                                .iter()
                                .map(|(a, _)| Action::to_string(a))
                                .collect::<Vec<_>>()
                                .join("|"),
                            history: history_label(history),
                        });
                    }
                    set.members.push(node_id);
                    id
                }
                None => {
                    let id = InfoSetId(sets.len() as u32);
                    sets.push(InfoSet {
                        id,
                        key: info.key(),
                        player: *to_move,
                        actions: actions.cloned().collect(),
                        members: vec![node_id],
                    });
                    ids.insert(info, id);
                    id
                }
            };
            by_node.insert(node_id, id);
        }

        Ok(InfoSetPartition { sets, by_node })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::dice::{build_game, DiceAction, DiceGame, DiceTree};

    fn partition(die_size: u8) -> (DiceTree, InfoSetPartition<DiceAction>) {
        let game = DiceGame::new(die_size).expect("valid die size");
        let tree = build_game(die_size).expect("build succeeds");
        let partition = InformationSetTagger::new(&game)
            .tag(&tree)
            .expect("tagging succeeds");
        (tree, partition)
    }

    #[test]
    fn test_info_set_counts() {
        // Each set holds one node per opponent face.
        for (die_size, expected) in [(1u8, 2usize), (2, 32), (3, 1_536)] {
            let (_, partition) = partition(die_size);
            assert_eq!(partition.len(), expected, "D = {}", die_size);
            assert!(partition
                .sets()
                .iter()
                .all(|set| set.members.len() == die_size as usize));
        }
    }

    #[test]
    fn test_members_share_observation() {
        let (tree, partition) = partition(2);
        for set in partition.sets() {
            let mut seen = None;
            for member in &set.members {
                match tree.node(*member) {
                    Some(Node::Decision {
                        to_move,
                        state,
                        history,
                        ..
                    }) => {
                        assert_eq!(*to_move, set.player);
                        let observed = (state.face(*to_move), history.clone());
                        let first = seen.get_or_insert_with(|| observed.clone());
                        assert_eq!(first, &observed);
                        assert_eq!(partition.info_set_of(*member), Some(set.id));
                    }
                    other => panic!("member is not a decision node: {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_ids_are_stable_across_builds() {
        let (_, first) = partition(2);
        let (_, second) = partition(2);
        assert_eq!(first.sets(), second.sets());
    }

    #[test]
    fn test_players_split_evenly_at_d1() {
        let (_, partition) = partition(1);
        assert_eq!(partition.for_player(Player::P1).count(), 1);
        assert_eq!(partition.for_player(Player::P2).count(), 1);
        let p2 = partition
            .for_player(Player::P2)
            .next()
            .expect("P2 has a set");
        assert_eq!(p2.actions, vec![DiceAction::Call]);
    }

    #[test]
    fn test_non_decision_nodes_untagged() {
        let (tree, partition) = partition(2);
        assert_eq!(partition.info_set_of(tree.root()), None);
    }
}
