//! Standard chess on shakmaty.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, EnPassantMode, Move, Position};

use super::{RulesEngine, Side, Termination};

/// Halfmove clock value at which the 75-move rule ends the game.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

const FIVEFOLD: usize = 5;

/// shakmaty position plus the repetition keys of every position reached so far.
#[derive(Debug, Clone)]
pub struct StandardPosition {
    chess: Chess,
    seen: Vec<String>,
}

impl StandardPosition {
    fn start() -> Self {
        let chess = Chess::default();
        let seen = vec![repetition_key(&chess)];
        Self { chess, seen }
    }

    fn repetitions(&self) -> usize {
        match self.seen.last() {
            Some(current) => self.seen.iter().filter(|key| *key == current).count(),
            None => 0,
        }
    }
}

/// FEN without move counters: placement, side, castling, en passant.
fn repetition_key(chess: &Chess) -> String {
    let fen = Fen::from_position(chess, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    pub fn new() -> Self {
        Self
    }
}

impl RulesEngine for StandardRules {
    type Position = StandardPosition;
    type Move = Move;

    fn initial_position(&self) -> StandardPosition {
        StandardPosition::start()
    }

    fn legal_moves(&self, pos: &StandardPosition) -> Vec<Move> {
        pos.chess.legal_moves().to_vec()
    }

    fn side_to_move(&self, pos: &StandardPosition) -> Side {
        match pos.chess.turn() {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }

    fn play(&self, pos: &StandardPosition, mv: &Move) -> StandardPosition {
        let mut next = pos.clone();
        next.chess.play_unchecked(mv.clone());
        next.seen.push(repetition_key(&next.chess));
        next
    }

    fn classify(&self, pos: &StandardPosition) -> Termination {
        let chess = &pos.chess;
        if chess.legal_moves().is_empty() {
            if chess.is_check() {
                Termination::Checkmate
            } else {
                Termination::Stalemate
            }
        } else if chess.is_insufficient_material() {
            Termination::InsufficientMaterial
        } else if chess.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            Termination::SeventyFiveMoveRule
        } else if pos.repetitions() >= FIVEFOLD {
            Termination::FivefoldRepetition
        } else {
            Termination::NotTerminal
        }
    }

    fn notation(&self, pos: &StandardPosition, mv: &Move) -> String {
        let mut chess = pos.chess.clone();
        SanPlus::from_move_and_play_unchecked(&mut chess, mv.clone()).to_string()
    }

    fn parse_move(&self, pos: &StandardPosition, notation: &str) -> Option<Move> {
        let san_plus: SanPlus = notation.parse().ok()?;
        san_plus.san.to_move(&pos.chess).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(rules: &StandardRules, sans: &[&str]) -> StandardPosition {
        let mut pos = rules.initial_position();
        for san in sans {
            let mv = rules.parse_move(&pos, san).unwrap();
            pos = rules.play(&pos, &mv);
        }
        pos
    }

    #[test]
    fn test_start_position() {
        let rules = StandardRules::new();
        let pos = rules.initial_position();
        assert_eq!(rules.legal_moves(&pos).len(), 20);
        assert_eq!(rules.side_to_move(&pos), Side::White);
        assert_eq!(rules.classify(&pos), Termination::NotTerminal);
    }

    #[test]
    fn test_fools_mate_is_checkmate() {
        let rules = StandardRules::new();
        let pos = play_all(&rules, &["f3", "e5", "g4", "Qh4"]);
        assert_eq!(rules.classify(&pos), Termination::Checkmate);
        assert_eq!(rules.side_to_move(&pos), Side::White);
        assert!(rules.legal_moves(&pos).is_empty());
    }

    #[test]
    fn test_knight_shuffle_reaches_fivefold() {
        let rules = StandardRules::new();
        let cycle = ["Nf3", "Nf6", "Ng1", "Ng8"];
        let mut sans = Vec::new();
        for _ in 0..3 {
            sans.extend_from_slice(&cycle);
        }
        // Start position seen 4 times so far.
        let pos = play_all(&rules, &sans);
        assert_eq!(rules.classify(&pos), Termination::NotTerminal);

        sans.extend_from_slice(&cycle);
        let pos = play_all(&rules, &sans);
        assert_eq!(rules.classify(&pos), Termination::FivefoldRepetition);
    }

    #[test]
    fn test_notation_includes_check_suffix() {
        let rules = StandardRules::new();
        let pos = play_all(&rules, &["e4", "f5"]);
        let mv = rules.parse_move(&pos, "Qh5").unwrap();
        assert_eq!(rules.notation(&pos, &mv), "Qh5+");
    }

    #[test]
    fn test_parse_move_rejects_illegal() {
        let rules = StandardRules::new();
        let pos = rules.initial_position();
        assert!(rules.parse_move(&pos, "e5").is_none());
        assert!(rules.parse_move(&pos, "not-a-move").is_none());
    }
}
