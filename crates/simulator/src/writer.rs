//! PGN file output.
//!
//! Board files are replaced atomically (temp file in the same directory, fsync,
//! rename) so a reader opening `board_N.pgn` at any moment sees a complete
//! game. Finished games are appended to `tournament.pgn`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::WriterError;

pub const TOURNAMENT_FILE_NAME: &str = "tournament.pgn";

/// File name of the record for `board`.
pub fn board_file_name(board: u32) -> String {
    format!("board_{board}.pgn")
}

#[derive(Debug, Clone)]
pub struct PgnWriter {
    output_directory: PathBuf,
    tournament_file: PathBuf,
}

impl PgnWriter {
    /// Create the writer, creating the output directory if needed.
    pub fn new(output_directory: impl Into<PathBuf>) -> Result<Self, WriterError> {
        let output_directory = output_directory.into();
        fs::create_dir_all(&output_directory).map_err(|source| WriterError::CreateDir {
            path: output_directory.clone(),
            source,
        })?;
        let tournament_file = output_directory.join(TOURNAMENT_FILE_NAME);
        debug!(dir = %output_directory.display(), "PgnWriter initialized");
        Ok(Self {
            output_directory,
            tournament_file,
        })
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn board_path(&self, board: u32) -> PathBuf {
        self.output_directory.join(board_file_name(board))
    }

    pub fn tournament_path(&self) -> &Path {
        &self.tournament_file
    }

    /// Atomically replace the record file of `board` with `pgn`.
    pub fn write_board_pgn(&self, board: u32, pgn: &str) -> Result<(), WriterError> {
        let destination = self.board_path(board);
        match self.replace_atomically(&destination, pgn) {
            Ok(()) => {
                debug!(board, path = %destination.display(), "Wrote board PGN");
                Ok(())
            }
            Err(source) => {
                error!(board, error = %source, "Error writing board PGN");
                Err(WriterError::Board { board, source })
            }
        }
    }

    fn replace_atomically(&self, destination: &Path, content: &str) -> io::Result<()> {
        // The temp file deletes itself if anything below fails before persist.
        let mut tmp = tempfile::Builder::new()
            .prefix(".board_")
            .suffix(".pgn.tmp")
            .tempfile_in(&self.output_directory)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;

        tmp.persist(destination).map_err(|err| {
            let _ = err.file.close();
            err.error
        })?;
        Ok(())
    }

    /// Append a finished game followed by a blank line to the tournament file.
    pub fn append_tournament_pgn(&self, pgn: &str) -> Result<(), WriterError> {
        let append = || -> io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.tournament_file)?;
            file.write_all(pgn.as_bytes())?;
            file.write_all(b"\n\n")?;
            file.sync_data()
        };

        append().map_err(|source| {
            error!(error = %source, "Error appending to tournament file");
            WriterError::Archive {
                path: self.tournament_file.clone(),
                source,
            }
        })?;
        debug!(path = %self.tournament_file.display(), "Appended game to tournament file");
        Ok(())
    }
}
