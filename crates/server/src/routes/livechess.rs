//! LiveChess Cloud compatible endpoints.
//!
//! Only one round exists; every board is a pairing in round 1.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chess_core::RulesEngine;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::live_cache::LiveCache;

/// Pollers append `?poll` or `?poll=<n>`; the value is ignored.
#[derive(Deserialize)]
pub struct PollQuery {
    pub poll: Option<String>,
}

fn content_etag<T: Serialize>(body: &T) -> Result<String, AppError> {
    let text = serde_json::to_string(body).map_err(|e| AppError::Internal(e.to_string()))?;
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    Ok(format!("\"{:x}\"", hasher.finish()))
}

fn with_etag<T: Serialize>(etag: String, body: T) -> Response {
    ([(header::ETAG, etag)], Json(body)).into_response()
}

/// `round-N` -> N
fn parse_round(segment: &str) -> Option<u32> {
    segment.strip_prefix("round-")?.parse().ok()
}

/// `game-N.json` -> N
fn parse_game_file(segment: &str) -> Option<u32> {
    segment.strip_prefix("game-")?.strip_suffix(".json")?.parse().ok()
}

/// GET /get/{code}/tournament.json
pub async fn get_tournament<R: RulesEngine>(
    Extension(cache): Extension<Arc<LiveCache<R>>>,
    Path(_code): Path<String>,
    Query(_poll): Query<PollQuery>,
) -> Result<Response, AppError> {
    let info = cache.tournament_info();
    let etag = content_etag(&info)?;
    Ok(with_etag(etag, info))
}

/// GET /get/{code}/round-{n}/index.json
/// GET /get/{code}/round-{n}/game-{board}.json
pub async fn get_round_file<R: RulesEngine>(
    Extension(cache): Extension<Arc<LiveCache<R>>>,
    Path((_code, round, file)): Path<(String, String, String)>,
    Query(_poll): Query<PollQuery>,
) -> Result<Response, AppError> {
    let round = parse_round(&round).ok_or_else(|| AppError::NotFound("Not found".to_string()))?;
    if round != 1 {
        return Err(AppError::NotFound(format!("Round {round} not found")));
    }

    if file == "index.json" {
        let index = cache.round_index();
        let etag = content_etag(&index)?;
        return Ok(with_etag(etag, index));
    }

    let board = parse_game_file(&file).ok_or_else(|| AppError::NotFound("Not found".to_string()))?;
    match cache.game(board).await {
        Ok(Some(game)) => {
            let etag = format!("\"{}\"", game.moves.len());
            Ok(with_etag(etag, game))
        }
        Ok(None) => Err(AppError::NotFound(format!("Game {board} not found"))),
        Err(e) => {
            tracing::warn!(board, error = %e, "Failed to read board PGN");
            Err(AppError::Unavailable(format!("Game {board} is unavailable")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        assert_eq!(parse_round("round-1"), Some(1));
        assert_eq!(parse_round("round-x"), None);
        assert_eq!(parse_round("1"), None);
        assert_eq!(parse_game_file("game-12.json"), Some(12));
        assert_eq!(parse_game_file("game-12"), None);
        assert_eq!(parse_game_file("index.json"), None);
    }

    #[test]
    fn test_content_etag_tracks_content() {
        let a = content_etag(&vec![1, 2]).unwrap();
        let b = content_etag(&vec![1, 2]).unwrap();
        let c = content_etag(&vec![1, 3]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with('"') && a.ends_with('"'));
    }
}
