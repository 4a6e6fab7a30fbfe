//! Small reference games implementing the engine traits.

pub mod kuhn;
pub mod pennies;

pub use kuhn::{KuhnPoker, KuhnState};
pub use pennies::{MatchingPennies, PenniesState};
