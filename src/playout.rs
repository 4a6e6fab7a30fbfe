//! Sampled play-throughs of a game under a set of policies.

use log::trace;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::action::{Action, Player};
use crate::error::{InvalidArgument, PolicyError};
use crate::game::{Game, State};
use crate::policy::Policy;

/// One finished game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playout {
    pub history: Vec<Action>,
    pub returns: Vec<f64>,
}

/// Aggregate over many playouts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayoutSummary {
    pub games: usize,
    pub mean_returns: Vec<f64>,
    pub mean_length: f64,
}

/// Play `game` to the end. Chance outcomes are sampled from the game's
/// distribution, decisions from the acting player's policy. `policies` holds
/// either one policy per player or a single policy used by everyone.
pub fn play<G, R>(
    game: &G,
    policies: &[&dyn Policy<G::State>],
    rng: &mut R,
) -> Result<Playout, PolicyError>
where
    G: Game,
    R: Rng + ?Sized,
{
    let num_players = game.num_players();
    if policies.len() != 1 && policies.len() != num_players {
        return Err(InvalidArgument::PolicyCount {
            expected: num_players,
            got: policies.len(),
        }
        .into());
    }
    let policy_for = |player: usize| policies[player.min(policies.len() - 1)];

    let mut state = game.new_initial_state();
    loop {
        match state.current_player() {
            Player::Terminal => break,
            Player::Chance => {
                let action = sample(&state.chance_outcomes(), rng)?;
                state = state.child(action);
            }
            Player::Id(player) => {
                let probabilities =
                    policy_for(player).action_probabilities(&state, Some(player))?;
                let pairs: Vec<_> = probabilities.into_iter().collect();
                let action = sample(&pairs, rng)?;
                trace!("player {player} plays {action} at {state}");
                state = state.child(action);
            }
            Player::Simultaneous => {
                let mut joint = Vec::with_capacity(num_players);
                for player in 0..num_players {
                    let probabilities =
                        policy_for(player).action_probabilities(&state, Some(player))?;
                    let pairs: Vec<_> = probabilities.into_iter().collect();
                    joint.push(sample(&pairs, rng)?);
                }
                state = state.joint_child(&joint)?;
            }
        }
    }
    Ok(Playout {
        history: state.history(),
        returns: state.returns(),
    })
}

/// Run `games` playouts and average the returns.
pub fn simulate<G, R>(
    game: &G,
    policies: &[&dyn Policy<G::State>],
    games: usize,
    rng: &mut R,
) -> Result<PlayoutSummary, PolicyError>
where
    G: Game,
    R: Rng + ?Sized,
{
    let mut totals = vec![0.0; game.num_players()];
    let mut length = 0usize;
    for _ in 0..games {
        let playout = play(game, policies, rng)?;
        for (total, value) in totals.iter_mut().zip(&playout.returns) {
            *total += value;
        }
        length += playout.history.len();
    }
    let scale = if games == 0 { 0.0 } else { 1.0 / games as f64 };
    Ok(PlayoutSummary {
        games,
        mean_returns: totals.into_iter().map(|total| total * scale).collect(),
        mean_length: length as f64 * scale,
    })
}

fn sample<R: Rng + ?Sized>(pairs: &[(Action, f64)], rng: &mut R) -> Result<Action, PolicyError> {
    let index = WeightedIndex::new(pairs.iter().map(|(_, weight)| *weight)).map_err(|err| {
        PolicyError::invalid_state(format!("cannot sample distribution: {err}"))
    })?;
    Ok(pairs[index.sample(rng)].0)
}
