//! Matching pennies: both players pick heads (0) or tails (1) at once.
//! Player 0 wins on a match, player 1 otherwise.

use std::fmt;

use crate::action::{Action, Player, PlayerId};
use crate::error::PolicyError;
use crate::game::{Capabilities, Game, State};

pub const HEADS: Action = 0;
pub const TAILS: Action = 1;

#[derive(Clone, Copy, Debug, Default)]
pub struct MatchingPennies;

impl Game for MatchingPennies {
    type State = PenniesState;

    fn name(&self) -> &str {
        "matching_pennies"
    }

    fn num_players(&self) -> usize {
        2
    }

    fn num_distinct_actions(&self) -> usize {
        2
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            observation_string: true,
            ..Capabilities::default()
        }
    }

    fn new_initial_state(&self) -> PenniesState {
        PenniesState::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PenniesState {
    choices: Option<[Action; 2]>,
}

fn side(action: Action) -> &'static str {
    if action == HEADS { "heads" } else { "tails" }
}

impl fmt::Display for PenniesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.choices {
            None => write!(f, "pennies: waiting"),
            Some([a, b]) => write!(f, "pennies: {} vs {}", side(a), side(b)),
        }
    }
}

impl State for PenniesState {
    fn current_player(&self) -> Player {
        match self.choices {
            None => Player::Simultaneous,
            Some(_) => Player::Terminal,
        }
    }

    fn legal_actions_mask(&self, player: PlayerId) -> Vec<bool> {
        let open = self.choices.is_none() && player < 2;
        vec![open; 2]
    }

    fn observation_string(&self, player: PlayerId) -> Option<String> {
        Some(match self.choices {
            None => format!("player {player} to choose"),
            Some([a, b]) => format!("player {player} saw {} and {}", side(a), side(b)),
        })
    }

    fn history(&self) -> Vec<Action> {
        self.choices.map(|c| c.to_vec()).unwrap_or_default()
    }

    fn child(&self, action: Action) -> Self {
        // No sequential moves exist here; mirror the choice for both players.
        Self {
            choices: Some([action, action]),
        }
    }

    fn joint_child(&self, actions: &[Action]) -> Result<Self, PolicyError> {
        match actions {
            [a, b] if self.choices.is_none() => Ok(Self {
                choices: Some([*a, *b]),
            }),
            _ => Err(PolicyError::invalid_state(format!(
                "expected two choices at the opening node, got {actions:?}"
            ))),
        }
    }

    fn returns(&self) -> Vec<f64> {
        match self.choices {
            None => vec![0.0, 0.0],
            Some([a, b]) if a == b => vec![1.0, -1.0],
            Some(_) => vec![-1.0, 1.0],
        }
    }
}
