//! Rules-engine capability shared by the simulator and the projection server.
//!
//! Everything that needs to know chess goes through [`RulesEngine`]: legal move
//! enumeration, applying a move, classifying terminal positions, and move
//! notation. [`StandardRules`] is the real implementation on top of shakmaty;
//! [`ScriptedRules`] plays a fixed script so orchestration can be tested
//! without chess semantics.

mod scripted;
mod standard;

use std::fmt;

pub use scripted::{ScriptedPosition, ScriptedRules};
pub use standard::{StandardPosition, StandardRules};

use crate::pgn::{PgnError, PgnRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

/// How a position ended, as reported by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    NotTerminal,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
    FivefoldRepetition,
    /// Game over for a reason the engine cannot name.
    Unrecognized,
}

impl Termination {
    pub fn is_terminal(self) -> bool {
        self != Termination::NotTerminal
    }
}

/// Game result as written to the PGN Result tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    InProgress,
}

impl GameResult {
    pub fn win_for(side: Side) -> Self {
        match side {
            Side::White => GameResult::WhiteWins,
            Side::Black => GameResult::BlackWins,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::InProgress => crate::pgn::IN_PROGRESS,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("illegal or unreadable move '{notation}' at ply {ply}")]
    IllegalMove { ply: usize, notation: String },
}

pub trait RulesEngine: Send + Sync + 'static {
    type Position: Clone + Send + Sync + 'static;
    type Move: Clone + Send + 'static;

    fn initial_position(&self) -> Self::Position;

    /// Legal moves in a stable order.
    fn legal_moves(&self, pos: &Self::Position) -> Vec<Self::Move>;

    fn side_to_move(&self, pos: &Self::Position) -> Side;

    /// Position after `mv`. `mv` must be one of `legal_moves(pos)`.
    fn play(&self, pos: &Self::Position, mv: &Self::Move) -> Self::Position;

    fn classify(&self, pos: &Self::Position) -> Termination;

    /// Notation of `mv` played from `pos`.
    fn notation(&self, pos: &Self::Position, mv: &Self::Move) -> String;

    /// Resolve stored notation against `pos`; `None` if it is not a legal move there.
    fn parse_move(&self, pos: &Self::Position, notation: &str) -> Option<Self::Move>;

    fn parse_record(&self, text: &str) -> Result<PgnRecord, PgnError> {
        PgnRecord::parse(text)
    }

    fn serialize_record(&self, record: &PgnRecord) -> String {
        record.to_pgn_string()
    }
}

/// Outcome of replaying a stored move list from the initial position.
#[derive(Debug, Clone)]
pub struct Replay<P> {
    pub position: P,
    /// Notation regenerated by the engine, one entry per ply.
    pub sans: Vec<String>,
}

/// Replay `moves` from the start, checking each one is legal where it is played.
pub fn replay<R: RulesEngine>(rules: &R, moves: &[String]) -> Result<Replay<R::Position>, RulesError> {
    let mut position = rules.initial_position();
    let mut sans = Vec::with_capacity(moves.len());

    for (ply, notation) in moves.iter().enumerate() {
        let mv = rules
            .parse_move(&position, notation)
            .ok_or_else(|| RulesError::IllegalMove {
                ply: ply + 1,
                notation: notation.clone(),
            })?;
        sans.push(rules.notation(&position, &mv));
        position = rules.play(&position, &mv);
    }

    Ok(Replay { position, sans })
}
