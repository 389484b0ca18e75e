//! Coin Dash Core - session logic for an arcade coin-collection game
//!
//! This crate provides the engine-independent core of Coin Dash: a player
//! collects randomly placed coins against a 60-second clock, progress
//! survives reloads, and an external text service supplies short
//! encouragement messages. Rendering, input, audio, and overlap detection
//! belong to the host engine; it drives the [`SessionController`] through
//! `on_coin_collected` and `on_tick` and renders from the returned updates.
//!
//! ## Modules
//!
//! - [`session`] - Round lifecycle state machine
//! - [`clock`] - Round countdown timing
//! - [`coin`] - Coin entities and spawn placement
//! - [`storage`] - Durable session progress storage
//! - [`feedback`] - AI feedback pipeline and message display
//! - [`config`] - Game configuration

pub mod clock;
pub mod coin;
pub mod config;
pub mod feedback;
pub mod session;
pub mod storage;

// Core types
pub use clock::RoundClock;
pub use coin::{Coin, CoinField};
pub use config::{ArenaBounds, ConfigError, FeedbackConfig, GameConfig};
pub use session::{RoundOutcome, RoundPhase, RoundUpdate, SessionController};

// Storage
pub use storage::{FileStore, KeyValueStore, MemoryStore, SavedProgress, SessionStore};

// Feedback pipeline
pub use feedback::{
    FeedbackMessage, FeedbackPipeline, FeedbackRequest, GenerativeTextService, MessageBoard,
    ResolvedFeedback, ServiceError, TextService,
};
