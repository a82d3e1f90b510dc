//! Simulator configuration loaded from a YAML file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicyKind {
    /// Uniformly random legal move.
    #[default]
    Random,
    /// Always the first legal move the rules engine lists.
    FirstLegal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SimulatorConfig {
    /// Seconds between ticks
    pub move_interval_seconds: f64,

    /// Number of boards played in parallel
    pub number_of_boards: u32,

    /// Half-move ceiling after which a game is drawn
    pub max_moves_per_game: u32,

    /// Directory receiving board_N.pgn and tournament.pgn
    pub output_directory: String,

    pub event_name: String,
    pub site: String,

    /// Round tag is "<round_prefix> <board>"
    #[serde(default)]
    pub round_prefix: String,

    #[serde(default)]
    pub auto_restart_games: bool,

    /// Append every finished game to tournament.pgn
    #[serde(default)]
    pub use_single_tournament_file: bool,

    #[serde(default)]
    pub move_policy: MovePolicyKind,

    /// Fixed seed for reproducible random play
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulatorConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.move_interval_seconds.is_finite() || self.move_interval_seconds <= 0.0 {
            return Err(ConfigError::Invalid("move_interval_seconds must be > 0"));
        }
        if Duration::try_from_secs_f64(self.move_interval_seconds).is_err() {
            return Err(ConfigError::Invalid("move_interval_seconds is too large"));
        }
        if self.number_of_boards == 0 {
            return Err(ConfigError::Invalid("number_of_boards must be > 0"));
        }
        if self.max_moves_per_game == 0 {
            return Err(ConfigError::Invalid("max_moves_per_game must be > 0"));
        }
        if self.output_directory.is_empty() {
            return Err(ConfigError::Invalid("output_directory cannot be empty"));
        }
        if self.event_name.is_empty() {
            return Err(ConfigError::Invalid("event_name cannot be empty"));
        }
        if self.site.is_empty() {
            return Err(ConfigError::Invalid("site cannot be empty"));
        }
        Ok(())
    }

    /// Tick period. Only meaningful on a validated config.
    pub fn move_interval(&self) -> Duration {
        Duration::from_secs_f64(self.move_interval_seconds)
    }
}
