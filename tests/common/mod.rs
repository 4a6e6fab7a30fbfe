#![allow(dead_code)]

use std::fmt;

use policy_table::{Action, Capabilities, Game, Player, PlayerId, State};

/// Two players, one decision: player 0 picks one of three actions and the
/// game ends.
#[derive(Clone, Copy, Debug)]
pub struct ToyGame {
    pub capabilities: Capabilities,
    pub num_actions: usize,
}

impl ToyGame {
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities {
                information_state_string: true,
                observation_string: true,
                information_state_tensor: true,
                observation_tensor: false,
            },
            num_actions: 3,
        }
    }

    pub fn without_capabilities() -> Self {
        Self {
            capabilities: Capabilities::default(),
            ..Self::new()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToyState {
    history: Vec<Action>,
}

impl fmt::Display for ToyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toy:{:?}", self.history)
    }
}

impl Game for ToyGame {
    type State = ToyState;

    fn name(&self) -> &str {
        "toy"
    }

    fn num_players(&self) -> usize {
        2
    }

    fn num_distinct_actions(&self) -> usize {
        self.num_actions
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn new_initial_state(&self) -> ToyState {
        ToyState::default()
    }
}

impl State for ToyState {
    fn current_player(&self) -> Player {
        if self.history.is_empty() {
            Player::Id(0)
        } else {
            Player::Terminal
        }
    }

    fn legal_actions_mask(&self, player: PlayerId) -> Vec<bool> {
        vec![self.current_player() == Player::Id(player); 3]
    }

    fn information_state_string(&self, player: PlayerId) -> Option<String> {
        Some(format!("p{player} root"))
    }

    fn observation_string(&self, _player: PlayerId) -> Option<String> {
        Some(String::from("obs root"))
    }

    fn information_state_tensor(&self, player: PlayerId) -> Option<Vec<f32>> {
        Some(vec![1.0, player as f32])
    }

    fn history(&self) -> Vec<Action> {
        self.history.clone()
    }

    fn child(&self, action: Action) -> Self {
        let mut history = self.history.clone();
        history.push(action);
        Self { history }
    }

    fn returns(&self) -> Vec<f64> {
        vec![0.0, 0.0]
    }
}

/// Player 0 moves, then player 1, then player 0 again without remembering
/// its first move. With `collide` set, player 1's key equals player 0's
/// opening key.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForgetfulGame {
    pub collide: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForgetfulState {
    collide: bool,
    history: Vec<Action>,
}

impl fmt::Display for ForgetfulState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "forgetful:{:?}", self.history)
    }
}

impl Game for ForgetfulGame {
    type State = ForgetfulState;

    fn name(&self) -> &str {
        "forgetful"
    }

    fn num_players(&self) -> usize {
        2
    }

    fn num_distinct_actions(&self) -> usize {
        3
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            information_state_string: true,
            ..Capabilities::default()
        }
    }

    fn new_initial_state(&self) -> ForgetfulState {
        ForgetfulState {
            collide: self.collide,
            history: Vec::new(),
        }
    }
}

impl State for ForgetfulState {
    fn current_player(&self) -> Player {
        match self.history.len() {
            0 | 2 => Player::Id(0),
            1 => Player::Id(1),
            _ => Player::Terminal,
        }
    }

    fn legal_actions_mask(&self, player: PlayerId) -> Vec<bool> {
        if self.current_player() != Player::Id(player) {
            return vec![false; 3];
        }
        match self.history.len() {
            0 => vec![true, true, false],
            1 => vec![true, true, true],
            _ => vec![false, true, true],
        }
    }

    fn information_state_string(&self, _player: PlayerId) -> Option<String> {
        let key = match self.history.len() {
            0 => "start",
            1 if self.collide => "start",
            1 => "mid",
            2 => "late",
            _ => "end",
        };
        Some(key.to_string())
    }

    fn history(&self) -> Vec<Action> {
        self.history.clone()
    }

    fn child(&self, action: Action) -> Self {
        let mut next = self.clone();
        next.history.push(action);
        next
    }

    fn returns(&self) -> Vec<f64> {
        vec![0.0, 0.0]
    }
}

/// A game that is over before anyone moves.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyGame;

#[derive(Clone, Debug, Default)]
pub struct EmptyState;

impl fmt::Display for EmptyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "empty")
    }
}

impl Game for EmptyGame {
    type State = EmptyState;

    fn name(&self) -> &str {
        "empty"
    }

    fn num_players(&self) -> usize {
        1
    }

    fn num_distinct_actions(&self) -> usize {
        1
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn new_initial_state(&self) -> EmptyState {
        EmptyState
    }
}

impl State for EmptyState {
    fn current_player(&self) -> Player {
        Player::Terminal
    }

    fn legal_actions_mask(&self, _player: PlayerId) -> Vec<bool> {
        vec![false]
    }

    fn history(&self) -> Vec<Action> {
        Vec::new()
    }

    fn child(&self, _action: Action) -> Self {
        EmptyState
    }

    fn returns(&self) -> Vec<f64> {
        vec![0.0]
    }
}

pub fn assert_rows_are_distributions<S: State>(table: &policy_table::PolicyTable<S>) {
    for index in 0..table.num_rows() {
        let row = table.row_at(index).expect("row");
        let mask = table.legal_mask(index).expect("mask");
        let mut total = 0.0;
        for (probability, legal) in row.iter().zip(mask) {
            if *legal {
                total += probability;
            } else {
                assert_eq!(*probability, 0.0, "illegal slot in row {index}");
            }
        }
        assert!((total - 1.0).abs() < 1e-9, "row {index} sums to {total}");
    }
}
