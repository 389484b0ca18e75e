//! Game configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Rectangular arena the player and coins live in.
///
/// Coins spawn inside the bounds inset by `margin` on every side so they are
/// always reachable and never rendered half off-screen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaBounds {
    /// Arena width in pixels (default: 1600)
    pub width: f32,

    /// Arena height in pixels (default: 800)
    pub height: f32,

    /// Spawn inset from every edge (default: 50)
    pub margin: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 800.0,
            margin: 50.0,
        }
    }
}

impl ArenaBounds {
    pub fn min_x(&self) -> f32 {
        self.margin
    }

    pub fn max_x(&self) -> f32 {
        self.width - self.margin
    }

    pub fn min_y(&self) -> f32 {
        self.margin
    }

    pub fn max_y(&self) -> f32 {
        self.height - self.margin
    }

    /// Whether a point lies inside the spawnable region (inclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x() && x <= self.max_x() && y >= self.min_y() && y <= self.max_y()
    }
}

/// Generative text service settings for the feedback pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Endpoint accepting `{ contents: [{ parts: [{ text }] }] }` POSTs
    pub endpoint: String,

    /// API key appended as the `key` query parameter (empty = unauthenticated)
    pub api_key: String,

    /// Per-request timeout in milliseconds (default: 10000)
    pub request_timeout_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            endpoint:
                "https://generativelanguage.googleapis.com/v1/models/gemini-pro:generateContent"
                    .to_string(),
            api_key: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Session configuration with all game parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ===== Arena =====
    /// Arena dimensions and spawn margin
    pub arena: ArenaBounds,

    /// Random seed for coin placement (None = random)
    pub seed: Option<u64>,

    // ===== Round Rules =====
    /// Round length in milliseconds (default: 60000)
    pub round_duration_ms: u64,

    /// Score that ends the round in victory (default: 10)
    pub win_score: u32,

    /// Interval between periodic progress saves (default: 1000)
    pub autosave_interval_ms: u64,

    // ===== Display Timing =====
    /// How long coin feedback messages stay on screen (default: 5000)
    pub coin_feedback_ms: u64,

    /// How long the victory notice stays on screen before the session
    /// returns to Idle (default: 3000)
    pub win_notice_ms: u64,

    /// How long the timeout notice stays on screen before the session
    /// returns to Idle (default: 2000)
    pub timeout_notice_ms: u64,

    // ===== External Services =====
    /// Generative text service settings
    pub feedback: FeedbackConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaBounds::default(),
            seed: None,
            round_duration_ms: 60_000,
            win_score: 10,
            autosave_interval_ms: 1_000,
            coin_feedback_ms: 5_000,
            win_notice_ms: 3_000,
            timeout_notice_ms: 2_000,
            feedback: FeedbackConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a config for short demo rounds
    pub fn quick_round() -> Self {
        Self {
            round_duration_ms: 15_000,
            win_score: 3,
            ..Default::default()
        }
    }

    /// Load a config from a TOML file; missing fields fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&text).map_err(ConfigError::Parse)
    }
}

/// Failure to load a config file
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config file: {}", err),
            ConfigError::Parse(err) => write!(f, "failed to parse config file: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}
