use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{Action, Player, PlayerId, mask_to_actions};
use crate::error::PolicyError;

/// Which string and tensor representations a game's states provide.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    pub information_state_string: bool,
    pub observation_string: bool,
    pub information_state_tensor: bool,
    pub observation_tensor: bool,
}

impl Capabilities {
    /// Key string identifying what `player` knows at `state`.
    ///
    /// Information-state strings are preferred over observation strings. When
    /// neither is provided the state's `Display` rendering is used.
    pub fn state_key<S: State>(&self, state: &S, player: PlayerId) -> String {
        if self.information_state_string {
            if let Some(key) = state.information_state_string(player) {
                return key;
            }
        }
        if self.observation_string {
            if let Some(key) = state.observation_string(player) {
                return key;
            }
        }
        state.to_string()
    }

    /// Numeric feature vector for `player` at `state`, if the game has one.
    pub fn state_features<S: State>(&self, state: &S, player: PlayerId) -> Option<Vec<f32>> {
        if self.information_state_tensor {
            state.information_state_tensor(player)
        } else if self.observation_tensor {
            state.observation_tensor(player)
        } else {
            None
        }
    }
}

/// Game engine boundary consumed by the policy table.
pub trait Game {
    type State: State;

    fn name(&self) -> &str;
    fn num_players(&self) -> usize;
    fn num_distinct_actions(&self) -> usize;
    fn capabilities(&self) -> Capabilities;
    fn new_initial_state(&self) -> Self::State;
}

/// A node of a game tree.
///
/// The string and tensor accessors return `None` unless the owning game
/// advertises the matching flag in its [`Capabilities`].
pub trait State: Clone + fmt::Display {
    fn current_player(&self) -> Player;

    fn is_terminal(&self) -> bool {
        matches!(self.current_player(), Player::Terminal)
    }

    fn is_chance_node(&self) -> bool {
        matches!(self.current_player(), Player::Chance)
    }

    fn is_simultaneous_node(&self) -> bool {
        matches!(self.current_player(), Player::Simultaneous)
    }

    /// One flag per distinct action of the game.
    fn legal_actions_mask(&self, player: PlayerId) -> Vec<bool>;

    fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        mask_to_actions(&self.legal_actions_mask(player))
    }

    fn information_state_string(&self, _player: PlayerId) -> Option<String> {
        None
    }

    fn observation_string(&self, _player: PlayerId) -> Option<String> {
        None
    }

    fn information_state_tensor(&self, _player: PlayerId) -> Option<Vec<f32>> {
        None
    }

    fn observation_tensor(&self, _player: PlayerId) -> Option<Vec<f32>> {
        None
    }

    /// Every action applied since the initial state, chance outcomes included.
    fn history(&self) -> Vec<Action>;

    /// Canonical identifier of the node.
    fn history_str(&self) -> String {
        self.history()
            .iter()
            .map(|action| action.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Outcome distribution at a chance node.
    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        Vec::new()
    }

    /// Successor after a single-player or chance action.
    fn child(&self, action: Action) -> Self;

    /// Successor after one action per player at a simultaneous node.
    fn joint_child(&self, _actions: &[Action]) -> Result<Self, PolicyError> {
        Err(PolicyError::invalid_state(
            "state does not support simultaneous moves",
        ))
    }

    /// Per-player utilities; only meaningful at terminal states.
    fn returns(&self) -> Vec<f64>;
}
