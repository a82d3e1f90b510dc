//! Simulator error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write PGN for board {board}: {source}")]
    Board {
        board: u32,
        source: std::io::Error,
    },

    #[error("Failed to append to tournament file {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        source: std::io::Error,
    },
}
