//! Tabular policies over finite extensive-form games, built against an
//! abstract game-engine interface.

pub mod action;
pub mod enumerate;
pub mod error;
pub mod game;
pub mod games;
pub mod playout;
pub mod policy;
pub mod render;
pub mod sparse;
pub mod table;

pub use crate::action::{Action, Player, PlayerId};
pub use crate::enumerate::{TreeWalk, decision_states};
pub use crate::error::{InvalidArgument, PolicyError};
pub use crate::game::{Capabilities, Game, State};
pub use crate::games::{KuhnPoker, MatchingPennies};
pub use crate::playout::{Playout, PlayoutSummary, play, simulate};
pub use crate::policy::{FirstActionPolicy, Policy, UniformRandomPolicy};
pub use crate::render::{RenderOptions, describe_sparse, render_table, render_table_with_options};
pub use crate::sparse::SparsePolicy;
pub use crate::table::{PolicyTable, TableBuilder};
