use thiserror::Error;

use crate::action::PlayerId;

/// Errors raised while building or querying a policy table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    #[error("no policy row registered for key {0:?}")]
    KeyNotFound(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Details of arguments rejected by a table or policy operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidArgument {
    #[error("player index {player} is out of range for a {num_players}-player game")]
    PlayerOutOfRange { player: PlayerId, num_players: usize },
    #[error("a player must be given at a node without a single acting player")]
    PlayerRequired,
    #[error("player {0} has no legal actions at this state")]
    NoLegalActions(PlayerId),
    #[error("mixing weight {0} must lie in [0, 1]")]
    MixingWeight(f64),
    #[error("noise temperature {0} must be finite")]
    Temperature(f64),
    #[error("expected 1 or {expected} policies, got {got}")]
    PolicyCount { expected: usize, got: usize },
}

impl PolicyError {
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        PolicyError::InvalidState(message.into())
    }
}
