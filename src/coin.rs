//! Coin entities and spawn placement
//!
//! The field enforces the single-coin policy: at most one coin is active at
//! any time, and a coin can be collected exactly once. Placement is drawn
//! from a seeded RNG so sessions can be made deterministic for testing.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::ArenaBounds;

/// A collectible coin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Manages the active coin and where the next one appears.
pub struct CoinField {
    bounds: ArenaBounds,
    rng: ChaCha8Rng,
    active: Option<Coin>,
    next_id: u32,
}

impl CoinField {
    /// Create a field over the given arena (None seed = random placement)
    pub fn new(bounds: ArenaBounds, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self {
            bounds,
            rng: ChaCha8Rng::seed_from_u64(seed),
            active: None,
            next_id: 1,
        }
    }

    /// Place a new coin, replacing any coin already on the field.
    ///
    /// The position is uniform over the arena interior, inset by the spawn
    /// margin on every side (inclusive bounds).
    pub fn spawn(&mut self) -> Coin {
        let id = self.next_id;
        self.next_id += 1;

        let coin = Coin {
            id,
            x: self.rng.gen_range(self.bounds.min_x()..=self.bounds.max_x()),
            y: self.rng.gen_range(self.bounds.min_y()..=self.bounds.max_y()),
        };
        self.active = Some(coin);
        coin
    }

    /// Remove the active coin if `id` matches it.
    ///
    /// Returns whether a coin was actually collected; a stale or repeated id
    /// collects nothing, which makes double-collection structurally
    /// impossible even if overlap events fire twice.
    pub fn collect(&mut self, id: u32) -> bool {
        if self.active.map(|c| c.id) == Some(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// The coin currently on the field, if any.
    pub fn active(&self) -> Option<Coin> {
        self.active
    }

    /// Remove the active coin without collecting it (round teardown).
    pub fn despawn(&mut self) {
        self.active = None;
    }
}
