use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "wrap-snake";
const SCORE_FILE_NAME: &str = "scores.json";

/// Storage for the best score across sessions.
pub trait ScoreStore {
    /// Returns the stored best score, or `Ok(0)` when nothing is stored yet.
    fn load_best_score(&mut self) -> io::Result<u32>;

    /// Replaces the stored best score.
    fn save_best_score(&mut self, score: u32) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    best_score: u32,
}

/// Best score kept in a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    /// Uses the platform-correct data directory.
    #[must_use]
    pub fn new() -> Self {
        Self::at(scores_path())
    }

    /// Uses an explicit file path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for JsonScoreStore {
    fn load_best_score(&mut self) -> io::Result<u32> {
        load_best_score_from_path(&self.path)
    }

    fn save_best_score(&mut self, score: u32) -> io::Result<()> {
        save_best_score_to_path(&self.path, score)
    }
}

/// Process-local store, used by tests and `--no-persist`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryScoreStore {
    best_score: u32,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn with_best_score(best_score: u32) -> Self {
        Self { best_score }
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best_score(&mut self) -> io::Result<u32> {
        Ok(self.best_score)
    }

    fn save_best_score(&mut self, score: u32) -> io::Result<()> {
        self.best_score = score;
        Ok(())
    }
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

fn load_best_score_from_path(path: &Path) -> io::Result<u32> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    serde_json::from_str::<ScoreFile>(&raw)
        .map(|file| file.best_score)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_best_score_to_path(path: &Path, score: u32) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = ScoreFile { best_score: score };
    let json = serde_json::to_string_pretty(&payload)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    fs::write(path, json)
}
