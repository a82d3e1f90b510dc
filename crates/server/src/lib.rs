pub mod config;
pub mod error;
pub mod live_cache;
pub mod projection;
pub mod routes;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use chess_core::RulesEngine;
use tower_http::cors::{Any, CorsLayer};

use live_cache::LiveCache;

/// LiveChess Cloud compatible router over `cache`.
pub fn app<R: RulesEngine>(cache: Arc<LiveCache<R>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check::<R>))
        .route(
            "/get/{code}/tournament.json",
            get(routes::livechess::get_tournament::<R>),
        )
        .route(
            "/get/{code}/{round}/{file}",
            get(routes::livechess::get_round_file::<R>),
        )
        .layer(Extension(cache))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chess_core::rules::StandardRules;
    use serde_json::{json, Value};
    use std::fs;
    use tower::ServiceExt;

    const BOARD_1: &str = "[Event \"Sim\"]\n[Round \"Round 1\"]\n[White \"Player 1 White\"]\n[Black \"Player 1 Black\"]\n[Result \"*\"]\n\n1. e4 e5 *";
    const BOARD_2: &str = "[White \"Player 2 White\"]\n[Black \"Player 2 Black\"]\n[Result \"0-1\"]\n\n1. f3 e5 2. g4 Qh4# 0-1";

    fn fixture() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("board_1.pgn"), BOARD_1).unwrap();
        fs::write(dir.path().join("board_2.pgn"), BOARD_2).unwrap();
        let cache = LiveCache::open(dir.path(), Arc::new(StandardRules::new())).unwrap();
        (dir, app(cache))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let etag = response
            .headers()
            .get(header::ETAG)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, etag, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, router) = fixture();
        let (status, _, body) = get_json(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["boards"], 2);
    }

    #[tokio::test]
    async fn test_tournament_info() {
        let (_dir, router) = fixture();
        let (status, etag, body) = get_json(router, "/get/any-code/tournament.json?poll").await;
        assert_eq!(status, StatusCode::OK);
        assert!(etag.is_some());
        assert_eq!(body, json!({"rounds": [{"count": 2, "live": 1}]}));
    }

    #[tokio::test]
    async fn test_round_index() {
        let (_dir, router) = fixture();
        let (status, _, body) = get_json(router, "/get/x/round-1/index.json?poll=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"pairings": [
                {"white": {"name": "Player 1 White"}, "black": {"name": "Player 1 Black"}, "result": "*", "live": true},
                {"white": {"name": "Player 2 White"}, "black": {"name": "Player 2 Black"}, "result": "0-1", "live": false},
            ]})
        );
    }

    #[tokio::test]
    async fn test_game_has_move_count_etag() {
        let (_dir, router) = fixture();
        let (status, etag, body) = get_json(router, "/get/x/round-1/game-2.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(etag.as_deref(), Some("\"4\""));
        assert_eq!(body["moves"], json!(["f3", "e5", "g4", "Qh4#"]));
        assert_eq!(body["finished"], true);
        assert_eq!(body["clock"], json!({"white": 0, "black": 0}));
    }

    #[tokio::test]
    async fn test_missing_game_and_round() {
        let (_dir, router) = fixture();
        let (status, _, body) = get_json(router.clone(), "/get/x/round-1/game-9.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Game 9 not found");

        let (status, _, _) = get_json(router.clone(), "/get/x/round-2/index.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = get_json(router, "/get/x/round-1/board.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreadable_game_is_unavailable() {
        let (dir, router) = fixture();
        fs::write(dir.path().join("board_3.pgn"), "[Result \"*\"]\n\n1. e4 e4 *").unwrap();
        let (status, _, _) = get_json(router, "/get/x/round-1/game-3.json").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (_dir, router) = fixture();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://viewer.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
