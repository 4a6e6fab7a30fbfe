//! Dense per-player policy tables.
//!
//! A [`PolicyTable`] holds one row per information state (or observation) at
//! which a player has a decision to make. Each row is a probability vector over
//! the game's full action space. Rows are grouped by player: every row of
//! player 0 comes before every row of player 1, and so on.
//!
//! The table's shape is fixed at construction. Keys, legal-action masks,
//! feature vectors and the originating states live behind an [`Arc`] shared by
//! every [`PolicyTable::duplicate`]; only the probability vector is owned per
//! instance.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use log::{debug, trace};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::action::{Action, PlayerId};
use crate::enumerate::TreeWalk;
use crate::error::{InvalidArgument, PolicyError};
use crate::game::{Capabilities, Game, State};

/// Read-only structure shared between duplicates of a table.
struct Layout<S> {
    capabilities: Capabilities,
    num_players: usize,
    num_actions: usize,
    players: Vec<PlayerId>,
    key_index: HashMap<String, usize>,
    keys: Vec<String>,
    row_players: Vec<PlayerId>,
    legal: Vec<Vec<bool>>,
    features: Vec<Option<Vec<f32>>>,
    states: Vec<S>,
    states_per_player: Vec<Vec<String>>,
    player_rows: Vec<Range<usize>>,
}

impl<S: State> Layout<S> {
    fn build<G>(
        game: &G,
        players: Vec<PlayerId>,
        states: &BTreeMap<String, S>,
    ) -> Result<Self, PolicyError>
    where
        G: Game<State = S>,
    {
        let num_players = game.num_players();
        let num_actions = game.num_distinct_actions();
        let capabilities = game.capabilities();
        let mut layout = Layout {
            capabilities,
            num_players,
            num_actions,
            players,
            key_index: HashMap::new(),
            keys: Vec::new(),
            row_players: Vec::new(),
            legal: Vec::new(),
            features: Vec::new(),
            states: Vec::new(),
            states_per_player: vec![Vec::new(); num_players],
            player_rows: vec![0..0; num_players],
        };

        for player in layout.players.clone() {
            let start = layout.keys.len();
            for state in states.values() {
                if !state.current_player().includes(player) {
                    continue;
                }
                let mask = state.legal_actions_mask(player);
                if mask.len() != num_actions {
                    return Err(PolicyError::invalid_state(format!(
                        "legal-actions mask has {} entries, game has {num_actions} actions",
                        mask.len()
                    )));
                }
                if !mask.iter().any(|legal| *legal) {
                    continue;
                }
                let key = capabilities.state_key(state, player);
                if layout.key_index.contains_key(&key) {
                    trace!("key {key:?} already registered, sharing its row");
                    continue;
                }
                let index = layout.keys.len();
                layout.key_index.insert(key.clone(), index);
                layout.states_per_player[player].push(key.clone());
                layout.keys.push(key);
                layout.row_players.push(player);
                layout.legal.push(mask);
                layout.features.push(capabilities.state_features(state, player));
                layout.states.push(state.clone());
            }
            layout.player_rows[player] = start..layout.keys.len();
        }
        Ok(layout)
    }
}

/// Builder for [`PolicyTable`].
pub struct TableBuilder<'g, G: Game> {
    game: &'g G,
    players: Option<Vec<PlayerId>>,
    states: Option<BTreeMap<String, G::State>>,
    walk: TreeWalk,
}

impl<'g, G: Game> TableBuilder<'g, G> {
    pub fn new(game: &'g G) -> Self {
        Self {
            game,
            players: None,
            states: None,
            walk: TreeWalk::new(),
        }
    }

    /// Restrict the table to these players. Order and repeats are ignored,
    /// and an empty list keeps every player.
    pub fn with_players(mut self, players: impl Into<Vec<PlayerId>>) -> Self {
        self.players = Some(players.into());
        self
    }

    /// Use a caller-provided enumeration of decision states keyed by their
    /// canonical identifier instead of walking the game tree.
    pub fn with_states(mut self, states: BTreeMap<String, G::State>) -> Self {
        self.states = Some(states);
        self
    }

    /// Depth limit for the built-in tree walk. Ignored with [`Self::with_states`].
    pub fn with_depth_limit(mut self, depth: usize) -> Self {
        self.walk = self.walk.with_depth_limit(depth);
        self
    }

    pub fn build(self) -> Result<PolicyTable<G::State>, PolicyError> {
        let num_players = self.game.num_players();
        let players = match self.players {
            Some(mut players) if !players.is_empty() => {
                players.sort_unstable();
                players.dedup();
                players
            }
            _ => (0..num_players).collect(),
        };
        if let Some(&player) = players.iter().find(|p| **p >= num_players) {
            return Err(InvalidArgument::PlayerOutOfRange {
                player,
                num_players,
            }
            .into());
        }
        let states = match self.states {
            Some(states) => states,
            None => self.walk.decision_states(self.game)?,
        };
        let layout = Layout::build(self.game, players, &states)?;
        debug!(
            "built policy table for {}: {} rows over {} actions",
            self.game.name(),
            layout.keys.len(),
            layout.num_actions
        );
        Ok(PolicyTable::uniform(Arc::new(layout)))
    }
}

/// Explicit per-information-state policy.
pub struct PolicyTable<S> {
    layout: Arc<Layout<S>>,
    probabilities: Vec<f64>,
}

impl<S: State> PolicyTable<S> {
    /// Uniform policy over the legal actions of every decision state of `game`.
    pub fn new<G>(game: &G) -> Result<Self, PolicyError>
    where
        G: Game<State = S>,
    {
        TableBuilder::new(game).build()
    }

    pub fn builder<G>(game: &G) -> TableBuilder<'_, G>
    where
        G: Game<State = S>,
    {
        TableBuilder::new(game)
    }

    /// Materialize an arbitrary policy function.
    ///
    /// Each row is overwritten with the probabilities `policy` returns for the
    /// row's state; actions it omits get 0.0. Nothing is renormalized, so the
    /// caller must ensure every row sums to 1 over its legal actions.
    pub fn from_callable<G, F, I>(
        game: &G,
        mut policy: F,
        players: Option<&[PlayerId]>,
    ) -> Result<Self, PolicyError>
    where
        G: Game<State = S>,
        F: FnMut(&S) -> I,
        I: IntoIterator<Item = (Action, f64)>,
    {
        let mut builder = TableBuilder::new(game);
        if let Some(players) = players {
            builder = builder.with_players(players);
        }
        let mut table = builder.build()?;
        table.overwrite_rows(|state, _| policy(state));
        Ok(table)
    }

    fn uniform(layout: Arc<Layout<S>>) -> Self {
        let mut probabilities = vec![0.0; layout.keys.len() * layout.num_actions];
        for (row, mask) in probabilities
            .chunks_exact_mut(layout.num_actions.max(1))
            .zip(&layout.legal)
        {
            let weight = 1.0 / mask.iter().filter(|legal| **legal).count() as f64;
            for (slot, legal) in row.iter_mut().zip(mask) {
                if *legal {
                    *slot = weight;
                }
            }
        }
        Self {
            layout,
            probabilities,
        }
    }

    /// Replace every row with the (action, probability) pairs `policy` yields
    /// for the row's state and owning player. Missing actions become 0.0 and
    /// actions outside the action space are ignored.
    pub fn overwrite_rows<F, I>(&mut self, mut policy: F)
    where
        F: FnMut(&S, PlayerId) -> I,
        I: IntoIterator<Item = (Action, f64)>,
    {
        let num_actions = self.layout.num_actions;
        let layout = &self.layout;
        for (index, state) in layout.states.iter().enumerate() {
            let row = &mut self.probabilities[index * num_actions..(index + 1) * num_actions];
            row.fill(0.0);
            for (action, probability) in policy(state, layout.row_players[index]) {
                if let Some(slot) = row.get_mut(action) {
                    *slot = probability;
                }
            }
        }
    }

    /// Stored probability of each legal action of `player` (or of the acting
    /// player when `None`) at `state`.
    pub fn probabilities_for(
        &self,
        state: &S,
        player: Option<PlayerId>,
    ) -> Result<BTreeMap<Action, f64>, PolicyError> {
        let player = self.resolve_player(state, player)?;
        let key = self.layout.capabilities.state_key(state, player);
        let row = self.row(&key)?;
        state
            .legal_actions(player)
            .into_iter()
            .map(|action| {
                row.get(action)
                    .map(|probability| (action, *probability))
                    .ok_or_else(|| {
                        PolicyError::invalid_state(format!(
                            "legal action {action} exceeds the action space"
                        ))
                    })
            })
            .collect()
    }

    /// Row index of `state` for its acting player.
    pub fn index_of(&self, state: &S) -> Result<usize, PolicyError> {
        let player = self.resolve_player(state, None)?;
        self.index_of_key(&self.layout.capabilities.state_key(state, player))
    }

    pub fn index_of_key(&self, key: &str) -> Result<usize, PolicyError> {
        self.layout
            .key_index
            .get(key)
            .copied()
            .ok_or_else(|| PolicyError::KeyNotFound(key.to_string()))
    }

    /// Key string used for `player` at `state`.
    pub fn state_key(&self, state: &S, player: PlayerId) -> String {
        self.layout.capabilities.state_key(state, player)
    }

    pub fn row(&self, key: &str) -> Result<&[f64], PolicyError> {
        let index = self.index_of_key(key)?;
        Ok(self.row_slice(index))
    }

    /// Mutable view of a row's probabilities. Writes go straight into the
    /// table; keeping the row a distribution is up to the caller.
    pub fn row_mut(&mut self, key: &str) -> Result<&mut [f64], PolicyError> {
        let index = self.index_of_key(key)?;
        let num_actions = self.layout.num_actions;
        Ok(&mut self.probabilities[index * num_actions..(index + 1) * num_actions])
    }

    pub fn row_at(&self, index: usize) -> Option<&[f64]> {
        (index < self.num_rows()).then(|| self.row_slice(index))
    }

    pub fn row_at_mut(&mut self, index: usize) -> Option<&mut [f64]> {
        let num_actions = self.layout.num_actions;
        if index < self.num_rows() {
            Some(&mut self.probabilities[index * num_actions..(index + 1) * num_actions])
        } else {
            None
        }
    }

    fn row_slice(&self, index: usize) -> &[f64] {
        let num_actions = self.layout.num_actions;
        &self.probabilities[index * num_actions..(index + 1) * num_actions]
    }

    /// Copy sharing the table structure. The probability vector is copied
    /// when `include_probabilities` is set and zero-filled otherwise.
    pub fn duplicate(&self, include_probabilities: bool) -> Self {
        let probabilities = if include_probabilities {
            self.probabilities.clone()
        } else {
            vec![0.0; self.probabilities.len()]
        };
        Self {
            layout: Arc::clone(&self.layout),
            probabilities,
        }
    }

    /// Copy mixed with random noise: `(1 - alpha) * row + alpha * noise`.
    ///
    /// The noise for a row is a softmax with temperature `beta` over one
    /// standard-normal draw per action, restricted to the row's legal
    /// actions. `alpha = 0` keeps the table, `alpha = 1` keeps only the noise,
    /// `beta = 0` makes the noise uniform over legal actions.
    pub fn with_noise<R>(&self, alpha: f64, beta: f64, rng: &mut R) -> Result<Self, PolicyError>
    where
        R: Rng + ?Sized,
    {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(InvalidArgument::MixingWeight(alpha).into());
        }
        if !beta.is_finite() {
            return Err(InvalidArgument::Temperature(beta).into());
        }
        let num_actions = self.layout.num_actions;
        let mut noisy = self.duplicate(false);
        let mut noise = vec![0.0f64; num_actions];
        for (index, mask) in self.layout.legal.iter().enumerate() {
            for slot in noise.iter_mut() {
                *slot = rng.sample(StandardNormal);
            }
            // The draw that maximises beta * z; scaling the offsets from it
            // keeps every exponent at or below zero for any finite beta.
            let peak = noise
                .iter()
                .zip(mask)
                .filter(|(_, legal)| **legal)
                .map(|(value, _)| *value)
                .reduce(|a, b| if beta >= 0.0 { a.max(b) } else { a.min(b) });
            let Some(peak) = peak else {
                return Err(PolicyError::invalid_state(format!(
                    "row {index} ({:?}) has no legal actions",
                    self.layout.keys[index]
                )));
            };
            let mut total = 0.0;
            for (slot, legal) in noise.iter_mut().zip(mask) {
                *slot = if *legal { (beta * (*slot - peak)).exp() } else { 0.0 };
                total += *slot;
            }
            let source = self.row_slice(index);
            let target = &mut noisy.probabilities[index * num_actions..(index + 1) * num_actions];
            for action in 0..num_actions {
                target[action] = if mask[action] {
                    (1.0 - alpha) * source[action] + alpha * (noise[action] / total)
                } else {
                    0.0
                };
            }
        }
        Ok(noisy)
    }

    fn resolve_player(&self, state: &S, player: Option<PlayerId>) -> Result<PlayerId, PolicyError> {
        match player {
            Some(player) if player < self.layout.num_players => Ok(player),
            Some(player) => Err(InvalidArgument::PlayerOutOfRange {
                player,
                num_players: self.layout.num_players,
            }
            .into()),
            None => state
                .current_player()
                .id()
                .ok_or_else(|| InvalidArgument::PlayerRequired.into()),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.layout.keys.len()
    }

    pub fn num_actions(&self) -> usize {
        self.layout.num_actions
    }

    pub fn num_players(&self) -> usize {
        self.layout.num_players
    }

    /// Players the table was built for, ascending.
    pub fn players(&self) -> &[PlayerId] {
        &self.layout.players
    }

    pub fn capabilities(&self) -> Capabilities {
        self.layout.capabilities
    }

    /// Keys in row order.
    pub fn keys(&self) -> &[String] {
        &self.layout.keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.layout.key_index.contains_key(key)
    }

    pub fn legal_mask(&self, index: usize) -> Option<&[bool]> {
        self.layout.legal.get(index).map(Vec::as_slice)
    }

    /// Information-state (or observation) tensor captured for a row.
    pub fn features(&self, index: usize) -> Option<&[f32]> {
        self.layout.features.get(index)?.as_deref()
    }

    /// State the row was first registered from.
    pub fn state(&self, index: usize) -> Option<&S> {
        self.layout.states.get(index)
    }

    pub fn states(&self) -> &[S] {
        &self.layout.states
    }

    pub fn row_player(&self, index: usize) -> Option<PlayerId> {
        self.layout.row_players.get(index).copied()
    }

    /// Keys at which `player` decides, in row order.
    pub fn states_for_player(&self, player: PlayerId) -> &[String] {
        self.layout
            .states_per_player
            .get(player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn row_count_for_player(&self, player: PlayerId) -> usize {
        self.states_for_player(player).len()
    }

    /// Contiguous row range belonging to `player`.
    pub fn player_rows(&self, player: PlayerId) -> Range<usize> {
        self.layout
            .player_rows
            .get(player)
            .cloned()
            .unwrap_or(0..0)
    }

    /// Flat row-major probability matrix of shape `num_rows x num_actions`.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// True when both tables share the same structure.
    pub fn shares_layout(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.layout, &other.layout)
    }
}

impl<S: State> Clone for PolicyTable<S> {
    fn clone(&self) -> Self {
        self.duplicate(true)
    }
}

impl<S> fmt::Debug for PolicyTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyTable")
            .field("rows", &self.layout.keys.len())
            .field("num_actions", &self.layout.num_actions)
            .field("players", &self.layout.players)
            .finish()
    }
}
