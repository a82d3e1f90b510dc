//! Deterministic stand-in for a real rules engine.
//!
//! Every position offers the same fixed list of moves, and terminal
//! classifications are scripted per ply. Notation is the move string itself, so
//! keep scripted moves SAN-shaped (`e4`, `Nf3`) if they go through PGN text.

use std::collections::BTreeMap;

use super::{RulesEngine, Side, Termination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedPosition {
    ply: usize,
}

impl ScriptedPosition {
    /// Half-moves played to reach this position.
    pub fn ply(&self) -> usize {
        self.ply
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedRules {
    moves: Vec<String>,
    endings: BTreeMap<usize, Termination>,
}

impl ScriptedRules {
    pub fn new<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            moves: moves.into_iter().map(Into::into).collect(),
            endings: BTreeMap::new(),
        }
    }

    /// Classify the position reached after `ply` half-moves as `termination`.
    /// Checkmate and stalemate positions also offer no legal moves.
    pub fn ending_at(mut self, ply: usize, termination: Termination) -> Self {
        self.endings.insert(ply, termination);
        self
    }
}

impl RulesEngine for ScriptedRules {
    type Position = ScriptedPosition;
    type Move = String;

    fn initial_position(&self) -> ScriptedPosition {
        ScriptedPosition { ply: 0 }
    }

    fn legal_moves(&self, pos: &ScriptedPosition) -> Vec<String> {
        match self.classify(pos) {
            Termination::Checkmate | Termination::Stalemate => Vec::new(),
            _ => self.moves.clone(),
        }
    }

    fn side_to_move(&self, pos: &ScriptedPosition) -> Side {
        if pos.ply % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    fn play(&self, pos: &ScriptedPosition, _mv: &String) -> ScriptedPosition {
        ScriptedPosition { ply: pos.ply + 1 }
    }

    fn classify(&self, pos: &ScriptedPosition) -> Termination {
        self.endings
            .get(&pos.ply)
            .copied()
            .unwrap_or(Termination::NotTerminal)
    }

    fn notation(&self, _pos: &ScriptedPosition, mv: &String) -> String {
        mv.clone()
    }

    fn parse_move(&self, pos: &ScriptedPosition, notation: &str) -> Option<String> {
        self.legal_moves(pos).into_iter().find(|mv| mv == notation)
    }
}
