//! Drives every board forward one move per tick and keeps the PGN files current.

use std::sync::Arc;

use chess_core::{GameResult, RulesEngine};
use tracing::info;

use crate::config::SimulatorConfig;
use crate::engine::{BoardEngine, GameSetup, TerminationReason};
use crate::error::WriterError;
use crate::policy::build_policy;
use crate::writer::PgnWriter;

/// A game that ended during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedGame {
    pub board: u32,
    pub game_index: u32,
    pub result: GameResult,
    pub reason: TerminationReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub moves_applied: usize,
    pub finished: Vec<FinishedGame>,
    /// Boards that started a new game this tick.
    pub restarted: Vec<u32>,
}

pub struct Orchestrator<R: RulesEngine> {
    config: SimulatorConfig,
    rules: Arc<R>,
    writer: PgnWriter,
    boards: Vec<BoardEngine<R>>,
}

impl<R: RulesEngine> Orchestrator<R> {
    /// Create every board at game 1 and write its empty record, so readers
    /// find a well-formed file before the first move.
    pub fn initialize(
        config: SimulatorConfig,
        rules: Arc<R>,
        writer: PgnWriter,
    ) -> Result<Self, WriterError> {
        let mut orchestrator = Self {
            config,
            rules,
            writer,
            boards: Vec::new(),
        };

        for board in 1..=orchestrator.config.number_of_boards {
            let engine = orchestrator.new_game(board, 1);
            orchestrator.persist(&engine)?;
            orchestrator.boards.push(engine);
        }

        info!("Initialized {} game boards", orchestrator.boards.len());
        Ok(orchestrator)
    }

    pub fn boards(&self) -> &[BoardEngine<R>] {
        &self.boards
    }

    pub fn board(&self, board: u32) -> Option<&BoardEngine<R>> {
        let slot = usize::try_from(board).ok()?.checked_sub(1)?;
        self.boards.get(slot)
    }

    fn new_game(&self, board: u32, game_index: u32) -> BoardEngine<R> {
        let setup = GameSetup {
            event: self.config.event_name.clone(),
            site: self.config.site.clone(),
            date: chrono::Local::now().format("%Y.%m.%d").to_string(),
            round_prefix: self.config.round_prefix.clone(),
            max_moves: self.config.max_moves_per_game,
        };
        let policy = build_policy(self.config.move_policy, self.config.seed, board, game_index);
        BoardEngine::new(self.rules.clone(), board, game_index, &setup, policy)
    }

    fn persist(&self, engine: &BoardEngine<R>) -> Result<(), WriterError> {
        self.writer
            .write_board_pgn(engine.board_index(), &engine.to_pgn_string())
    }

    /// One move attempt per unfinished board, in board order. Every write
    /// happens before this returns; the first write failure aborts the tick.
    pub fn tick(&mut self) -> Result<TickSummary, WriterError> {
        let mut summary = TickSummary::default();

        for slot in 0..self.boards.len() {
            let engine = &mut self.boards[slot];
            if engine.is_terminal() {
                continue;
            }
            // `None` here means the position offered no legal move; the engine
            // is terminal now and still has to be finalized.
            if engine.make_move().is_some() {
                summary.moves_applied += 1;
                log_move(engine);
                self.persist(&self.boards[slot])?;
            }

            if self.boards[slot].is_terminal() {
                self.finish_game(slot, &mut summary)?;
            }
        }

        Ok(summary)
    }

    /// Write the final record, archive it when enabled, and start the next
    /// game on the board when auto-restart is on.
    fn finish_game(&mut self, slot: usize, summary: &mut TickSummary) -> Result<(), WriterError> {
        let engine = &self.boards[slot];
        let finished = FinishedGame {
            board: engine.board_index(),
            game_index: engine.game_index(),
            result: engine.result(),
            reason: engine.termination_reason(),
        };
        info!(
            "Board {}: Game finished - result {} ({})",
            finished.board, finished.result, finished.reason
        );

        let final_pgn = engine.to_pgn_string();
        self.writer.write_board_pgn(finished.board, &final_pgn)?;
        if self.config.use_single_tournament_file {
            self.writer.append_tournament_pgn(&final_pgn)?;
        }

        if self.config.auto_restart_games {
            let replacement = self.new_game(finished.board, finished.game_index + 1);
            self.boards[slot] = replacement;
            self.persist(&self.boards[slot])?;
            info!(
                "Board {}: Started new game #{}",
                finished.board,
                finished.game_index + 1
            );
            summary.restarted.push(finished.board);
        }
        summary.finished.push(finished);
        Ok(())
    }

    /// Write every board's current record, finished or not. All boards are
    /// attempted; the first failure is returned.
    pub fn shutdown(&self) -> Result<(), WriterError> {
        info!("Shutting down, writing final PGN states...");
        let mut first_error = None;
        for engine in &self.boards {
            if let Err(err) = self.persist(engine) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => {
                info!("Shutdown complete");
                Ok(())
            }
        }
    }
}

/// "Board 2: 5. Nf3" for White, "Board 2: 5... Nc6" for Black.
fn log_move<R: RulesEngine>(engine: &BoardEngine<R>) {
    let Some(san) = engine.last_move_san() else {
        return;
    };
    let count = engine.move_count();
    let full_move = (count + 1) / 2;
    if count % 2 == 1 {
        info!("Board {}: {}. {}", engine.board_index(), full_move, san);
    } else {
        info!("Board {}: {}... {}", engine.board_index(), full_move, san);
    }
}
