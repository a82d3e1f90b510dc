//! A single board's game: position, move history, termination.

use std::fmt;
use std::sync::Arc;

use chess_core::{GameResult, PgnRecord, RulesEngine, Termination, IN_PROGRESS};

use crate::policy::MovePolicy;

/// Tag values shared by every game of the run.
#[derive(Debug, Clone)]
pub struct GameSetup {
    pub event: String,
    pub site: String,
    /// PGN date, "YYYY.MM.DD"
    pub date: String,
    pub round_prefix: String,
    pub max_moves: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    MaxMovesReached,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
    FivefoldRepetition,
    Unknown,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::MaxMovesReached => "max moves reached",
            TerminationReason::Checkmate => "checkmate",
            TerminationReason::Stalemate => "stalemate",
            TerminationReason::InsufficientMaterial => "insufficient material",
            TerminationReason::SeventyFiveMoveRule => "75-move rule",
            TerminationReason::FivefoldRepetition => "fivefold repetition",
            TerminationReason::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One game on one board. Moves stop for good once the game is terminal;
/// a restart builds a new engine with the next game index.
pub struct BoardEngine<R: RulesEngine> {
    rules: Arc<R>,
    board_index: u32,
    game_index: u32,
    max_moves: u32,
    move_count: u32,
    position: R::Position,
    record: PgnRecord,
    policy: Box<dyn MovePolicy>,
    /// Set when the engine offered no legal move in a non-terminal position.
    exhausted: bool,
}

impl<R: RulesEngine> BoardEngine<R> {
    pub fn new(
        rules: Arc<R>,
        board_index: u32,
        game_index: u32,
        setup: &GameSetup,
        policy: Box<dyn MovePolicy>,
    ) -> Self {
        let mut record = PgnRecord::new();
        record.set_tag("Event", setup.event.as_str());
        record.set_tag("Site", setup.site.as_str());
        record.set_tag("Date", setup.date.as_str());
        record.set_tag("Round", format!("{} {}", setup.round_prefix, board_index));
        record.set_tag("White", format!("Player {board_index} White"));
        record.set_tag("Black", format!("Player {board_index} Black"));
        record.set_tag("Board", board_index.to_string());
        if game_index > 1 {
            record.set_tag("GameID", game_index.to_string());
        }
        record.set_tag("Result", IN_PROGRESS);

        let position = rules.initial_position();
        Self {
            rules,
            board_index,
            game_index,
            max_moves: setup.max_moves,
            move_count: 0,
            position,
            record,
            policy,
            exhausted: false,
        }
    }

    pub fn board_index(&self) -> u32 {
        self.board_index
    }

    pub fn game_index(&self) -> u32 {
        self.game_index
    }

    /// Half-moves applied so far.
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn position(&self) -> &R::Position {
        &self.position
    }

    pub fn moves(&self) -> &[String] {
        &self.record.moves
    }

    pub fn last_move_san(&self) -> Option<&str> {
        self.record.moves.last().map(String::as_str)
    }

    /// Play one move chosen by the policy. Returns its notation, or `None`
    /// when the game is already over.
    pub fn make_move(&mut self) -> Option<String> {
        if self.is_terminal() {
            return None;
        }

        let legal = self.rules.legal_moves(&self.position);
        if legal.is_empty() {
            self.exhausted = true;
            return None;
        }

        let choice = self.policy.pick(legal.len()).min(legal.len() - 1);
        let mv = &legal[choice];
        let san = self.rules.notation(&self.position, mv);
        self.position = self.rules.play(&self.position, mv);
        self.record.moves.push(san.clone());
        self.move_count += 1;
        Some(san)
    }

    fn reached_ceiling(&self) -> bool {
        self.move_count >= self.max_moves
    }

    pub fn is_terminal(&self) -> bool {
        self.reached_ceiling() || self.exhausted || self.rules.classify(&self.position).is_terminal()
    }

    /// The ceiling is checked before anything the rules engine reports.
    pub fn result(&self) -> GameResult {
        if !self.is_terminal() {
            return GameResult::InProgress;
        }
        if self.reached_ceiling() {
            return GameResult::Draw;
        }
        match self.rules.classify(&self.position) {
            Termination::Checkmate => {
                // The side to move is mated.
                GameResult::win_for(self.rules.side_to_move(&self.position).opposite())
            }
            _ => GameResult::Draw,
        }
    }

    pub fn termination_reason(&self) -> TerminationReason {
        if self.reached_ceiling() {
            return TerminationReason::MaxMovesReached;
        }
        match self.rules.classify(&self.position) {
            Termination::Checkmate => TerminationReason::Checkmate,
            Termination::Stalemate => TerminationReason::Stalemate,
            Termination::InsufficientMaterial => TerminationReason::InsufficientMaterial,
            Termination::SeventyFiveMoveRule => TerminationReason::SeventyFiveMoveRule,
            Termination::FivefoldRepetition => TerminationReason::FivefoldRepetition,
            Termination::NotTerminal | Termination::Unrecognized => TerminationReason::Unknown,
        }
    }

    /// Snapshot of the record with the Result tag filled in.
    pub fn record(&self) -> PgnRecord {
        let mut record = self.record.clone();
        record.set_tag("Result", self.result().as_str());
        record
    }

    pub fn to_pgn_string(&self) -> String {
        self.rules.serialize_record(&self.record())
    }
}
