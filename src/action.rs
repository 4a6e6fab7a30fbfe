use serde::{Deserialize, Serialize};

/// Zero-based index of a player within the game.
pub type PlayerId = usize;

/// Index into a game's distinct action space.
pub type Action = usize;

/// Who is to move at a given state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// A single player acts.
    Id(PlayerId),
    /// Every player submits an action in the same turn.
    Simultaneous,
    /// The environment samples an outcome.
    Chance,
    /// The game is over.
    Terminal,
}

impl Player {
    /// Returns the acting player when exactly one player moves.
    pub fn id(&self) -> Option<PlayerId> {
        match self {
            Player::Id(player) => Some(*player),
            _ => None,
        }
    }

    /// True when `player` has a decision to make at a node owned by `self`.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Player::Id(id) => *id == player,
            Player::Simultaneous => true,
            Player::Chance | Player::Terminal => false,
        }
    }
}

/// Indices of the `true` entries of a legal-actions mask.
pub fn mask_to_actions(mask: &[bool]) -> Vec<Action> {
    mask.iter()
        .enumerate()
        .filter_map(|(action, legal)| legal.then_some(action))
        .collect()
}
