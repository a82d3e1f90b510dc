use std::path::Path;
use std::time::Duration;

use simulator::config::MovePolicyKind;
use simulator::SimulatorConfig;

/// Deterministic simulator settings writing into `dir`.
pub fn sim_config(dir: &Path, boards: u32, max_moves: u32) -> SimulatorConfig {
    SimulatorConfig {
        move_interval_seconds: 0.01,
        number_of_boards: boards,
        max_moves_per_game: max_moves,
        output_directory: dir.display().to_string(),
        event_name: "Integration Open".into(),
        site: "Test Hall".into(),
        round_prefix: "Round".into(),
        auto_restart_games: false,
        use_single_tournament_file: false,
        move_policy: MovePolicyKind::FirstLegal,
        seed: None,
    }
}

/// Poll `check` every 25ms until it holds or `timeout` passes.
pub async fn eventually<F: FnMut() -> bool>(timeout: Duration, mut check: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
