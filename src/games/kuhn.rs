//! Three-card Kuhn poker.
//!
//! Each player antes one chip and receives one of the cards 0 < 1 < 2. Player
//! 0 acts first; the actions are pass (0) and bet (1). A bet facing a pass is
//! a fold, a bet facing a bet is a call.

use std::fmt;

use crate::action::{Action, Player, PlayerId};
use crate::game::{Capabilities, Game, State};

pub const NUM_CARDS: usize = 3;
pub const NUM_PLAYERS: usize = 2;
pub const PASS: Action = 0;
pub const BET: Action = 1;

const MAX_MOVES: usize = 3;
const INFORMATION_STATE_FEATURES: usize = NUM_PLAYERS + NUM_CARDS + 2 * MAX_MOVES;
const OBSERVATION_FEATURES: usize = NUM_PLAYERS + NUM_CARDS + NUM_PLAYERS;

#[derive(Clone, Copy, Debug, Default)]
pub struct KuhnPoker;

impl Game for KuhnPoker {
    type State = KuhnState;

    fn name(&self) -> &str {
        "kuhn_poker"
    }

    fn num_players(&self) -> usize {
        NUM_PLAYERS
    }

    fn num_distinct_actions(&self) -> usize {
        2
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            information_state_string: true,
            observation_string: true,
            information_state_tensor: true,
            observation_tensor: true,
        }
    }

    fn new_initial_state(&self) -> KuhnState {
        KuhnState::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KuhnState {
    cards: Vec<usize>,
    moves: Vec<Action>,
}

impl KuhnState {
    pub fn card(&self, player: PlayerId) -> Option<usize> {
        self.cards.get(player).copied()
    }

    fn is_over(&self) -> bool {
        matches!(
            self.moves.as_slice(),
            [PASS, PASS] | [BET, PASS] | [BET, BET] | [PASS, BET, PASS] | [PASS, BET, BET]
        )
    }

    fn contributions(&self) -> [f64; NUM_PLAYERS] {
        let mut pot = [1.0; NUM_PLAYERS];
        for (index, action) in self.moves.iter().enumerate() {
            if *action == BET {
                pot[index % NUM_PLAYERS] += 1.0;
            }
        }
        pot
    }

    fn move_letters(&self) -> String {
        self.moves
            .iter()
            .map(|action| if *action == BET { 'b' } else { 'p' })
            .collect()
    }
}

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards: Vec<String> = self.cards.iter().map(|c| c.to_string()).collect();
        write!(f, "{} {}", cards.join(" "), self.move_letters())
    }
}

impl State for KuhnState {
    fn current_player(&self) -> Player {
        if self.cards.len() < NUM_PLAYERS {
            Player::Chance
        } else if self.is_over() {
            Player::Terminal
        } else {
            Player::Id(self.moves.len() % NUM_PLAYERS)
        }
    }

    fn legal_actions_mask(&self, player: PlayerId) -> Vec<bool> {
        let acting = self.current_player() == Player::Id(player);
        vec![acting; 2]
    }

    fn information_state_string(&self, player: PlayerId) -> Option<String> {
        let card = self.card(player)?;
        Some(format!("{card}{}", self.move_letters()))
    }

    fn observation_string(&self, player: PlayerId) -> Option<String> {
        let card = self.card(player)?;
        let pot = self.contributions();
        Some(format!("{card} {} {}", pot[0], pot[1]))
    }

    fn information_state_tensor(&self, player: PlayerId) -> Option<Vec<f32>> {
        let card = self.card(player)?;
        let mut out = vec![0.0; INFORMATION_STATE_FEATURES];
        out[player] = 1.0;
        out[NUM_PLAYERS + card] = 1.0;
        for (index, action) in self.moves.iter().enumerate() {
            out[NUM_PLAYERS + NUM_CARDS + 2 * index + action] = 1.0;
        }
        Some(out)
    }

    fn observation_tensor(&self, player: PlayerId) -> Option<Vec<f32>> {
        let card = self.card(player)?;
        let mut out = vec![0.0; OBSERVATION_FEATURES];
        out[player] = 1.0;
        out[NUM_PLAYERS + card] = 1.0;
        for (slot, chips) in self.contributions().iter().enumerate() {
            out[NUM_PLAYERS + NUM_CARDS + slot] = *chips as f32;
        }
        Some(out)
    }

    fn history(&self) -> Vec<Action> {
        self.cards.iter().chain(self.moves.iter()).copied().collect()
    }

    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        if !self.is_chance_node() {
            return Vec::new();
        }
        let remaining: Vec<usize> = (0..NUM_CARDS).filter(|c| !self.cards.contains(c)).collect();
        let probability = 1.0 / remaining.len() as f64;
        remaining.into_iter().map(|c| (c, probability)).collect()
    }

    fn child(&self, action: Action) -> Self {
        let mut next = self.clone();
        if next.is_chance_node() {
            next.cards.push(action);
        } else {
            next.moves.push(action);
        }
        next
    }

    fn returns(&self) -> Vec<f64> {
        if !self.is_terminal() {
            return vec![0.0; NUM_PLAYERS];
        }
        let pot = self.contributions();
        let folded = self.moves.last() == Some(&PASS) && self.moves.contains(&BET);
        let winner = if folded {
            // The player who passed last gave up the hand.
            self.moves.len() % NUM_PLAYERS
        } else if self.cards[0] > self.cards[1] {
            0
        } else {
            1
        };
        let loser = 1 - winner;
        let mut out = vec![0.0; NUM_PLAYERS];
        out[winner] = pot[loser];
        out[loser] = -pot[loser];
        out
    }
}
