//! Exhaustive enumeration of the decision states of a game.

use std::collections::BTreeMap;

use log::debug;

use crate::action::Action;
use crate::error::PolicyError;
use crate::game::{Game, State};

/// Depth-first walk over a game tree collecting every decision state.
///
/// States are keyed by [`State::history_str`]; a history reached twice is
/// expanded once. Terminal and chance nodes are traversed but not collected.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeWalk {
    depth_limit: Option<usize>,
}

impl TreeWalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop expanding below this many actions from the root. Chance outcomes
    /// count towards the depth.
    pub fn with_depth_limit(mut self, depth: usize) -> Self {
        self.depth_limit = Some(depth);
        self
    }

    pub fn decision_states<G: Game>(
        &self,
        game: &G,
    ) -> Result<BTreeMap<String, G::State>, PolicyError> {
        let mut found = BTreeMap::new();
        let mut stack = vec![(game.new_initial_state(), 0usize)];
        while let Some((state, depth)) = stack.pop() {
            if state.is_terminal() {
                continue;
            }
            let expand = self.depth_limit.is_none_or(|limit| depth < limit);
            if state.is_chance_node() {
                if expand {
                    for (outcome, _) in state.chance_outcomes() {
                        stack.push((state.child(outcome), depth + 1));
                    }
                }
                continue;
            }
            let key = state.history_str();
            if found.contains_key(&key) {
                continue;
            }
            if expand {
                if state.is_simultaneous_node() {
                    for joint in joint_actions(&state, game.num_players()) {
                        stack.push((state.joint_child(&joint)?, depth + 1));
                    }
                } else if let Some(player) = state.current_player().id() {
                    for action in state.legal_actions(player) {
                        stack.push((state.child(action), depth + 1));
                    }
                }
            }
            found.insert(key, state);
        }
        debug!(
            "enumerated {} decision states of {}",
            found.len(),
            game.name()
        );
        Ok(found)
    }
}

/// Decision states of `game` using an unlimited [`TreeWalk`].
pub fn decision_states<G: Game>(game: &G) -> Result<BTreeMap<String, G::State>, PolicyError> {
    TreeWalk::new().decision_states(game)
}

/// Cartesian product of every player's legal actions. A player without legal
/// actions leaves the product empty.
fn joint_actions<S: State>(state: &S, num_players: usize) -> Vec<Vec<Action>> {
    let mut joint = vec![Vec::with_capacity(num_players)];
    for player in 0..num_players {
        let legal = state.legal_actions(player);
        joint = joint
            .into_iter()
            .flat_map(|prefix| {
                legal.iter().map(move |&action| {
                    let mut next = prefix.clone();
                    next.push(action);
                    next
                })
            })
            .collect();
    }
    joint
}
