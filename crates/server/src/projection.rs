//! PGN record → LiveChess Cloud JSON.
//!
//! The shapes here are the wire schema pollers expect; field names must not
//! change.

use chess_core::{replay, PgnRecord, RulesEngine, RulesError, IN_PROGRESS};
use serde::Serialize;

/// Clock shown for both sides while a game is running, in centiseconds (1 hour).
/// No real timing is simulated.
pub const RUNNING_CLOCK_CENTIS: u64 = 360_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clock {
    pub white: u64,
    pub black: u64,
}

/// Per-board game object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameProjection {
    pub moves: Vec<String>,
    pub result: String,
    pub finished: bool,
    pub clock: Clock,
    pub white: String,
    pub black: String,
    pub round: String,
    pub event: String,
}

impl GameProjection {
    pub fn is_live(&self) -> bool {
        !self.finished
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub white: PlayerName,
    pub black: PlayerName,
    pub result: String,
    pub live: bool,
}

/// Round index object: one pairing per board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundIndex {
    pub pairings: Vec<Pairing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub count: usize,
    pub live: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TournamentInfo {
    pub rounds: Vec<RoundSummary>,
}

/// Build the game object for `board`. Moves are replayed from the start
/// position, so the notation served is the engine's, not the file's text.
pub fn project_game<R: RulesEngine>(
    rules: &R,
    board: u32,
    record: &PgnRecord,
) -> Result<GameProjection, RulesError> {
    let replayed = replay(rules, &record.moves)?;

    let result = record.result().to_string();
    let finished = result != IN_PROGRESS;
    let clock = if finished {
        Clock { white: 0, black: 0 }
    } else {
        Clock {
            white: RUNNING_CLOCK_CENTIS,
            black: RUNNING_CLOCK_CENTIS,
        }
    };

    Ok(GameProjection {
        moves: replayed.sans,
        result,
        finished,
        clock,
        white: record
            .tag("White")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Player {board} White")),
        black: record
            .tag("Black")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Player {board} Black")),
        round: record.tag("Round").unwrap_or_default().to_string(),
        event: record.tag("Event").unwrap_or_default().to_string(),
    })
}

impl From<&GameProjection> for Pairing {
    fn from(game: &GameProjection) -> Self {
        Pairing {
            white: PlayerName {
                name: game.white.clone(),
            },
            black: PlayerName {
                name: game.black.clone(),
            },
            result: game.result.clone(),
            live: game.result == IN_PROGRESS,
        }
    }
}
