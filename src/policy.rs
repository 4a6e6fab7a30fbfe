use std::collections::BTreeMap;

use crate::action::{Action, PlayerId};
use crate::error::{InvalidArgument, PolicyError};
use crate::game::{Game, State};
use crate::table::PolicyTable;

/// Distribution over actions for a player at a state.
pub trait Policy<S: State> {
    /// Probability of each action for `player`, or for the acting player when
    /// `None`. Entries are expected to be non-negative and sum to 1; actions
    /// that are missing count as probability 0.
    fn action_probabilities(
        &self,
        state: &S,
        player: Option<PlayerId>,
    ) -> Result<BTreeMap<Action, f64>, PolicyError>;

    /// Equivalent [`PolicyTable`], queried once per row for the row's player.
    fn to_tabular<G>(
        &self,
        game: &G,
        players: Option<&[PlayerId]>,
    ) -> Result<PolicyTable<S>, PolicyError>
    where
        G: Game<State = S>,
        Self: Sized,
    {
        let mut builder = PolicyTable::builder(game);
        if let Some(players) = players {
            builder = builder.with_players(players);
        }
        let mut table = builder.build()?;
        let mut rows = Vec::with_capacity(table.num_rows());
        for (index, state) in table.states().iter().enumerate() {
            let player = table.row_player(index);
            rows.push(self.action_probabilities(state, player)?);
        }
        let mut rows = rows.into_iter();
        table.overwrite_rows(|_, _| rows.next().unwrap_or_default());
        Ok(table)
    }
}

fn legal_actions_for<S: State>(
    state: &S,
    player: Option<PlayerId>,
) -> Result<Vec<Action>, PolicyError> {
    let player = match player {
        Some(player) => player,
        None => state
            .current_player()
            .id()
            .ok_or(InvalidArgument::PlayerRequired)?,
    };
    let legal = state.legal_actions(player);
    if legal.is_empty() {
        return Err(InvalidArgument::NoLegalActions(player).into());
    }
    Ok(legal)
}

/// Uniform distribution over the legal actions, computed on demand. Suited to
/// games too large for a table.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformRandomPolicy;

impl<S: State> Policy<S> for UniformRandomPolicy {
    fn action_probabilities(
        &self,
        state: &S,
        player: Option<PlayerId>,
    ) -> Result<BTreeMap<Action, f64>, PolicyError> {
        let legal = legal_actions_for(state, player)?;
        let probability = 1.0 / legal.len() as f64;
        Ok(legal.into_iter().map(|action| (action, probability)).collect())
    }
}

/// Always plays the lowest-numbered legal action.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstActionPolicy;

impl<S: State> Policy<S> for FirstActionPolicy {
    fn action_probabilities(
        &self,
        state: &S,
        player: Option<PlayerId>,
    ) -> Result<BTreeMap<Action, f64>, PolicyError> {
        let legal = legal_actions_for(state, player)?;
        let first = legal[0];
        Ok(legal
            .into_iter()
            .map(|action| (action, if action == first { 1.0 } else { 0.0 }))
            .collect())
    }
}

impl<S: State> Policy<S> for PolicyTable<S> {
    fn action_probabilities(
        &self,
        state: &S,
        player: Option<PlayerId>,
    ) -> Result<BTreeMap<Action, f64>, PolicyError> {
        self.probabilities_for(state, player)
    }
}
