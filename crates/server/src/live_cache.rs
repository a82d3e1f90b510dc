//! Live view of the simulator's PGN output directory.
//!
//! The cache keeps one projection per `board_N.pgn` for listings and
//! aggregates. A `notify` watcher pushes changed paths onto a bounded channel;
//! a single task drains it and is the only writer of the map. Per-board reads
//! never use the map: they re-read the file, so a request arriving between a
//! write and its notification still sees the latest moves.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chess_core::{PgnError, RulesEngine, RulesError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::projection::{project_game, GameProjection, Pairing, RoundIndex, RoundSummary, TournamentInfo};

/// Pending change notifications before the watcher thread blocks.
const EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Pgn { path: PathBuf, source: PgnError },

    #[error("invalid moves in {}: {source}", path.display())]
    Moves { path: PathBuf, source: RulesError },

    #[error("invalid directory pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Board index encoded in a `board_N.pgn` file name.
pub fn board_index_from_path(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix("board_")?.strip_suffix(".pgn")?.parse().ok()
}

pub struct LiveCache<R: RulesEngine> {
    directory: PathBuf,
    rules: Arc<R>,
    entries: RwLock<BTreeMap<u32, GameProjection>>,
    watching: AtomicBool,
}

impl<R: RulesEngine> LiveCache<R> {
    /// Create the cache and load every board file already in `directory`.
    /// Files that fail to parse are logged and skipped.
    pub fn open(directory: impl Into<PathBuf>, rules: Arc<R>) -> Result<Arc<Self>, CacheError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|source| CacheError::Io {
            path: directory.clone(),
            source,
        })?;

        let cache = Self {
            directory,
            rules,
            entries: RwLock::new(BTreeMap::new()),
            watching: AtomicBool::new(false),
        };
        cache.load_all()?;
        Ok(Arc::new(cache))
    }

    fn load_all(&self) -> Result<(), CacheError> {
        info!("Loading PGN files from {}", self.directory.display());
        let pattern = format!(
            "{}/board_*.pgn",
            glob::Pattern::escape(&self.directory.to_string_lossy())
        );

        let mut loaded = BTreeMap::new();
        for path in glob::glob(&pattern)?.filter_map(|p| p.ok()) {
            let Some(board) = board_index_from_path(&path) else {
                warn!(path = %path.display(), "Could not parse board index from file name");
                continue;
            };
            let projected = std::fs::read_to_string(&path)
                .map_err(|source| CacheError::Io {
                    path: path.clone(),
                    source,
                })
                .and_then(|text| self.project(board, &path, &text));
            match projected {
                Ok(game) => {
                    debug!(board, "Loaded PGN");
                    loaded.insert(board, game);
                }
                Err(e) => error!(board, error = %e, "Error loading board PGN"),
            }
        }

        info!("Loaded {} board PGN files", loaded.len());
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        Ok(())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn board_path(&self, board: u32) -> PathBuf {
        self.directory.join(format!("board_{board}.pgn"))
    }

    fn project(&self, board: u32, path: &Path, text: &str) -> Result<GameProjection, CacheError> {
        let record = self.rules.parse_record(text).map_err(|source| CacheError::Pgn {
            path: path.to_path_buf(),
            source,
        })?;
        project_game(self.rules.as_ref(), board, &record).map_err(|source| CacheError::Moves {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `Ok(None)` when the file does not exist.
    async fn read_board(&self, board: u32) -> Result<Option<GameProjection>, CacheError> {
        let path = self.board_path(board);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        self.project(board, &path, &text).map(Some)
    }

    /// Current game on `board`, read straight from disk.
    pub async fn game(&self, board: u32) -> Result<Option<GameProjection>, CacheError> {
        self.read_board(board).await
    }

    /// Known board indices, ascending.
    pub fn boards(&self) -> Vec<u32> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.keys().copied().collect()
    }

    pub fn round_index(&self) -> RoundIndex {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        RoundIndex {
            pairings: entries.values().map(Pairing::from).collect(),
        }
    }

    /// Every board is reported as part of a single round.
    pub fn tournament_info(&self) -> TournamentInfo {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if entries.is_empty() {
            return TournamentInfo::default();
        }
        TournamentInfo {
            rounds: vec![RoundSummary {
                count: entries.len(),
                live: entries.values().filter(|game| game.is_live()).count(),
            }],
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::Relaxed)
    }

    /// Re-read the board file named by `path` and replace its entry.
    ///
    /// Only the watcher task calls this. Re-running it for unchanged content
    /// yields the same entry. A vanished file drops the entry; an unparsable
    /// one keeps the previous entry until the next change.
    pub async fn apply_change(&self, path: &Path) {
        let Some(board) = board_index_from_path(path) else {
            return;
        };

        match self.read_board(board).await {
            Ok(Some(game)) => {
                debug!(board, "PGN file changed");
                let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
                entries.insert(board, game);
            }
            Ok(None) => {
                let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
                if entries.remove(&board).is_some() {
                    info!(board, "Board PGN removed");
                }
            }
            Err(e) => warn!(board, error = %e, "Error reloading board PGN"),
        }
    }

    /// Start watching the directory. The returned handle must be shut down to
    /// stop the watcher and its task.
    pub fn watch(self: &Arc<Self>) -> Result<CacheWatcher<R>, CacheError> {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(EVENT_QUEUE_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                for path in event.paths {
                    if board_index_from_path(&path).is_some() {
                        // Runs on the watcher's own thread, outside the runtime.
                        let _ = tx.blocking_send(path);
                    }
                }
            }
            Err(e) => warn!(error = %e, "File watcher error"),
        })?;
        watcher.watch(&self.directory, RecursiveMode::NonRecursive)?;

        let cache = Arc::clone(self);
        let task = tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                // Coalesce whatever else is queued; one refresh per file.
                let mut pending = BTreeSet::from([path]);
                while let Ok(more) = rx.try_recv() {
                    pending.insert(more);
                }
                for path in pending {
                    cache.apply_change(&path).await;
                }
            }
        });

        self.watching.store(true, Ordering::Relaxed);
        info!("Started watching {} for changes", self.directory.display());

        Ok(CacheWatcher {
            cache: Arc::clone(self),
            watcher,
            task,
        })
    }
}

/// Running watcher plus its refresh task.
pub struct CacheWatcher<R: RulesEngine> {
    cache: Arc<LiveCache<R>>,
    watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl<R: RulesEngine> CacheWatcher<R> {
    pub async fn shutdown(self) {
        drop(self.watcher);
        self.task.abort();
        let _ = self.task.await;
        self.cache.watching.store(false, Ordering::Relaxed);
        info!("Stopped watching {}", self.cache.directory().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::rules::StandardRules;
    use std::fs;

    const RUNNING: &str = "[Event \"Sim\"]\n[Round \"Round 1\"]\n[White \"Player 1 White\"]\n[Black \"Player 1 Black\"]\n[Result \"*\"]\n\n1. e4 e5 *";
    const FINISHED: &str = "[White \"Player 2 White\"]\n[Black \"Player 2 Black\"]\n[Result \"0-1\"]\n\n1. f3 e5 2. g4 Qh4# 0-1";

    fn open(dir: &Path) -> Arc<LiveCache<StandardRules>> {
        LiveCache::open(dir, Arc::new(StandardRules::new())).unwrap()
    }

    #[test]
    fn test_board_index_from_path() {
        assert_eq!(board_index_from_path(Path::new("/x/board_12.pgn")), Some(12));
        assert_eq!(board_index_from_path(Path::new("board_1.pgn")), Some(1));
        assert_eq!(board_index_from_path(Path::new("tournament.pgn")), None);
        assert_eq!(board_index_from_path(Path::new(".board_abc.pgn.tmp")), None);
        assert_eq!(board_index_from_path(Path::new("board_x.pgn")), None);
    }

    #[tokio::test]
    async fn test_open_loads_existing_boards_and_skips_broken() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("board_1.pgn"), RUNNING).unwrap();
        fs::write(dir.path().join("board_2.pgn"), FINISHED).unwrap();
        fs::write(dir.path().join("board_3.pgn"), "[Result \"*\"]\n\n1. e4 e4 *").unwrap();
        fs::write(dir.path().join("tournament.pgn"), FINISHED).unwrap();

        let cache = open(dir.path());
        assert_eq!(cache.boards(), vec![1, 2]);

        let info = serde_json::to_value(cache.tournament_info()).unwrap();
        assert_eq!(info, serde_json::json!({"rounds": [{"count": 2, "live": 1}]}));

        let index = cache.round_index();
        assert_eq!(index.pairings.len(), 2);
        assert!(index.pairings[0].live);
        assert_eq!(index.pairings[1].result, "0-1");
        assert_eq!(index.pairings[1].white.name, "Player 2 White");
    }

    #[tokio::test]
    async fn test_empty_directory_has_no_rounds() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open(dir.path());
        assert_eq!(cache.directory(), dir.path());
        assert!(cache.boards().is_empty());
        assert!(cache.tournament_info().rounds.is_empty());
        assert!(cache.round_index().pairings.is_empty());
    }

    #[tokio::test]
    async fn test_game_reads_disk_not_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("board_1.pgn"), RUNNING).unwrap();
        let cache = open(dir.path());

        fs::write(
            dir.path().join("board_1.pgn"),
            RUNNING.replace("1. e4 e5 *", "1. e4 e5 2. Nf3 *"),
        )
        .unwrap();

        let game = cache.game(1).await.unwrap().unwrap();
        assert_eq!(game.moves, vec!["e4", "e5", "Nf3"]);
        // No notification has been processed yet.
        assert_eq!(cache.round_index().pairings.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_board_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open(dir.path());
        assert!(cache.game(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_broken_board_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("board_4.pgn"), "").unwrap();
        let cache = open(dir.path());
        assert!(matches!(cache.game(4).await, Err(CacheError::Pgn { .. })));
    }

    #[tokio::test]
    async fn test_apply_change_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open(dir.path());
        let path = dir.path().join("board_2.pgn");
        fs::write(&path, FINISHED).unwrap();

        cache.apply_change(&path).await;
        let first = serde_json::to_vec(&cache.round_index()).unwrap();
        cache.apply_change(&path).await;
        cache.apply_change(&path).await;
        let second = serde_json::to_vec(&cache.round_index()).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.boards(), vec![2]);
    }

    #[tokio::test]
    async fn test_apply_change_handles_removal_and_bad_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board_1.pgn");
        fs::write(&path, RUNNING).unwrap();
        let cache = open(dir.path());

        fs::write(&path, "garbage that is not pgn").unwrap();
        cache.apply_change(&path).await;
        // Previous entry survives a bad read.
        assert_eq!(cache.boards(), vec![1]);

        fs::remove_file(&path).unwrap();
        cache.apply_change(&path).await;
        assert!(cache.boards().is_empty());

        cache.apply_change(&dir.path().join("tournament.pgn")).await;
        assert!(cache.boards().is_empty());
    }

    #[tokio::test]
    async fn test_watcher_picks_up_new_board() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open(dir.path());
        let watcher = cache.watch().unwrap();
        assert!(cache.is_watching());

        fs::write(dir.path().join("board_5.pgn"), RUNNING).unwrap();

        let mut seen = false;
        for _ in 0..100 {
            if cache.boards() == vec![5] {
                seen = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        watcher.shutdown().await;

        assert!(seen, "watcher never reported board_5.pgn");
        assert!(!cache.is_watching());
    }
}
