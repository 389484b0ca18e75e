//! Durable session progress storage
//!
//! Progress is a pair of string-valued keys (`score`, `timeLeft`) in a small
//! key-value store, mirroring the browser-localStorage layout the game
//! shipped with. Storage trouble of any kind is non-fatal: a missing,
//! unreadable, or corrupt store reads as "no prior session" and the round
//! starts fresh.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Storage key for the saved score (decimal string)
pub const SCORE_KEY: &str = "score";

/// Storage key for the saved remaining time in milliseconds (decimal string)
pub const TIME_LEFT_KEY: &str = "timeLeft";

/// A string key-value store the session can persist progress into.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and storage-less sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// File-backed store persisting the key-value map as one JSON object.
///
/// Writes go through on every mutation; a failed write is logged and dropped
/// rather than surfaced, so the game keeps running without persistence.
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    /// Open a store at `path`, reading any existing contents.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(values) => values,
                Err(err) => {
                    log::warn!(
                        "session file {} is corrupt, starting empty: {}",
                        path.display(),
                        err
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, values }
    }

    fn flush(&self) {
        let json = match serde_json::to_string(&self.values) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("failed to encode session data: {}", err);
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, json) {
            log::warn!(
                "failed to write session file {}: {}",
                self.path.display(),
                err
            );
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
        self.flush();
    }
}

/// Progress snapshot read back from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedProgress {
    pub score: u32,
    pub time_left_ms: u64,
}

/// The session's view of durable storage.
///
/// The controller is the single writer; nothing else holds a reference to
/// the underlying store.
pub struct SessionStore {
    inner: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(inner: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Read back saved progress.
    ///
    /// Returns `Some` only if both keys are present and parse as
    /// non-negative integers; anything else reads as "no resumable session".
    pub fn load(&self) -> Option<SavedProgress> {
        let score = parse_non_negative(&self.inner.get(SCORE_KEY)?)?;
        let time_left_ms = parse_non_negative(&self.inner.get(TIME_LEFT_KEY)?)?;
        let score = u32::try_from(score).ok()?;
        Some(SavedProgress {
            score,
            time_left_ms,
        })
    }

    /// Overwrite both progress keys. Idempotent, safe at 1 Hz plus on every
    /// score change.
    pub fn save(&mut self, score: u32, time_left_ms: u64) {
        self.inner.set(SCORE_KEY, &score.to_string());
        self.inner.set(TIME_LEFT_KEY, &time_left_ms.to_string());
    }

    /// Remove all progress keys; a subsequent `load` returns `None`.
    pub fn clear(&mut self) {
        self.inner.remove(SCORE_KEY);
        self.inner.remove(TIME_LEFT_KEY);
    }
}

fn parse_non_negative(value: &str) -> Option<u64> {
    value.trim().parse::<i64>().ok().filter(|v| *v >= 0).map(|v| v as u64)
}
