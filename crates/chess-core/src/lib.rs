pub mod pgn;
pub mod rules;

pub use pgn::{PgnError, PgnRecord, IN_PROGRESS};
pub use rules::{replay, GameResult, Replay, RulesEngine, RulesError, Side, Termination};
