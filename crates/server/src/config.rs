use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory the simulator writes `board_N.pgn` files into.
    pub output_directory: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("PGN_SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PGN_SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            output_directory: env::var("PGN_OUTPUT_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./pgn_output")),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
