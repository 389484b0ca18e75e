//! Round lifecycle state machine
//!
//! The controller owns the round, the clock, the coin field, and the durable
//! store, and is driven entirely by explicit events: `on_coin_collected` from
//! the engine's overlap callback and `on_tick` from its update loop. It holds
//! no engine types and performs no I/O beyond the store, so the whole
//! lifecycle is testable without a renderer.
//!
//! Event ordering within one update cycle is fixed: collection events are
//! applied before the periodic tick, so reaching the winning score in the
//! same instant the clock expires always resolves as a win.

use serde::{Deserialize, Serialize};

use crate::clock::RoundClock;
use crate::coin::{Coin, CoinField};
use crate::config::GameConfig;
use crate::feedback::FeedbackRequest;
use crate::storage::SessionStore;

/// Notice shown when the clock runs out below the milestone.
pub const TIMEOUT_NOTICE: &str = "⏰ You are too slow! Try again...";

/// Notice shown when the milestone is reached.
pub fn win_notice(win_score: u32) -> String {
    format!("🎉 Congratulations! You collected {} coins!", win_score)
}

/// Where the session currently is in the round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round running (menu)
    Idle,
    /// Round in progress
    Playing,
    /// Milestone reached; notice on screen, returning to Idle shortly
    Won,
    /// Clock expired; notice on screen, returning to Idle shortly
    TimedOut,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Won,
    TimedOut,
}

/// One play-through's mutable state.
#[derive(Debug, Clone, Copy, Default)]
struct Round {
    score: u32,
    /// Set exactly once, at the Won/TimedOut transition.
    ended: bool,
}

/// What an event handler wants the engine layer to do.
///
/// The handlers mutate session state and return this; the engine integration
/// renders the score, forwards `feedback` to the pipeline, and posts
/// `notice` to the message board. Nothing here feeds back into the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundUpdate {
    pub score: u32,
    pub time_left_ms: u64,
    pub phase: RoundPhase,
    /// Set only on the tick that ended the round.
    pub outcome: Option<RoundOutcome>,
    /// Fixed end-of-round text to display, if the round just ended.
    pub notice: Option<String>,
    /// Feedback request to hand to the pipeline, fallback already chosen.
    pub feedback: Option<FeedbackRequest>,
}

/// Orchestrates round start, continue, collection, and end-of-round.
pub struct SessionController {
    config: GameConfig,
    store: SessionStore,
    clock: RoundClock,
    coins: CoinField,
    round: Round,
    phase: RoundPhase,
    /// Timestamp of the Won/TimedOut transition, for the notice dwell.
    ended_at_ms: u64,
    last_autosave_ms: u64,
}

impl SessionController {
    /// Create an idle session. Call `start_new_round` or `continue_round`
    /// to begin playing.
    pub fn new(config: GameConfig, store: SessionStore) -> Self {
        let clock = RoundClock::new(config.round_duration_ms);
        let coins = CoinField::new(config.arena, config.seed);
        Self {
            config,
            store,
            clock,
            coins,
            round: Round::default(),
            phase: RoundPhase::Idle,
            ended_at_ms: 0,
            last_autosave_ms: 0,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.round.score
    }

    /// The coin currently on the field, for the render layer.
    pub fn coin(&self) -> Option<Coin> {
        self.coins.active()
    }

    pub fn time_left_ms(&self, now_ms: u64) -> u64 {
        self.clock.remaining(now_ms)
    }

    /// Begin a fresh round: forget any saved progress, write the fresh
    /// snapshot, spawn the first coin.
    pub fn start_new_round(&mut self, now_ms: u64) -> RoundUpdate {
        self.store.clear();
        self.store.save(0, self.config.round_duration_ms);
        self.clock.start(now_ms);
        self.begin(now_ms, 0)
    }

    /// Resume the saved round if one exists, else start fresh.
    pub fn continue_round(&mut self, now_ms: u64) -> RoundUpdate {
        match self.store.load() {
            Some(saved) => {
                log::info!(
                    "resuming round: score {}, {} ms left",
                    saved.score,
                    saved.time_left_ms
                );
                self.clock.start_from_remaining(now_ms, saved.time_left_ms);
                self.begin(now_ms, saved.score)
            }
            None => {
                log::info!("no resumable session, starting fresh");
                self.start_new_round(now_ms)
            }
        }
    }

    /// Abandon whatever is on screen and start a fresh round.
    pub fn reset(&mut self, now_ms: u64) -> RoundUpdate {
        self.start_new_round(now_ms)
    }

    fn begin(&mut self, now_ms: u64, score: u32) -> RoundUpdate {
        self.round = Round {
            score,
            ended: false,
        };
        self.phase = RoundPhase::Playing;
        self.last_autosave_ms = now_ms;
        self.coins.spawn();
        self.snapshot(now_ms)
    }

    /// Handle the engine's player/coin overlap event.
    ///
    /// Outside of Playing this is a no-op: overlap events racing an
    /// end-of-round transition are expected and silently dropped.
    pub fn on_coin_collected(&mut self, now_ms: u64) -> RoundUpdate {
        if self.phase != RoundPhase::Playing || self.round.ended {
            return self.snapshot(now_ms);
        }
        let Some(coin) = self.coins.active() else {
            return self.snapshot(now_ms);
        };
        if !self.coins.collect(coin.id) {
            return self.snapshot(now_ms);
        }

        self.round.score += 1;
        // Write-after-mutate: the save always carries the new score.
        self.store
            .save(self.round.score, self.clock.remaining(now_ms));
        self.coins.spawn();

        if self.round.score >= self.config.win_score {
            self.end_round(now_ms, RoundOutcome::Won)
        } else {
            let mut update = self.snapshot(now_ms);
            update.feedback = Some(FeedbackRequest::coin(self.config.coin_feedback_ms));
            update
        }
    }

    /// Handle the engine's periodic update tick.
    ///
    /// While Playing: autosave at the configured interval and check for
    /// expiry. In a terminal phase: return to Idle once the notice has been
    /// on screen long enough.
    pub fn on_tick(&mut self, now_ms: u64) -> RoundUpdate {
        match self.phase {
            RoundPhase::Playing => {
                if now_ms.saturating_sub(self.last_autosave_ms) >= self.config.autosave_interval_ms
                {
                    self.last_autosave_ms = now_ms;
                    self.store
                        .save(self.round.score, self.clock.remaining(now_ms));
                }
                if self.clock.is_expired(now_ms) && self.round.score < self.config.win_score {
                    return self.end_round(now_ms, RoundOutcome::TimedOut);
                }
                self.snapshot(now_ms)
            }
            RoundPhase::Won | RoundPhase::TimedOut => {
                let dwell_ms = if self.phase == RoundPhase::Won {
                    self.config.win_notice_ms
                } else {
                    self.config.timeout_notice_ms
                };
                if now_ms.saturating_sub(self.ended_at_ms) >= dwell_ms {
                    self.phase = RoundPhase::Idle;
                    self.coins.despawn();
                }
                self.snapshot(now_ms)
            }
            RoundPhase::Idle => self.snapshot(now_ms),
        }
    }

    fn end_round(&mut self, now_ms: u64, outcome: RoundOutcome) -> RoundUpdate {
        self.round.ended = true;
        self.ended_at_ms = now_ms;
        self.store.clear();

        let mut update = self.snapshot(now_ms);
        match outcome {
            RoundOutcome::Won => {
                log::info!("round won with {} coins", self.round.score);
                self.phase = RoundPhase::Won;
                update.notice = Some(win_notice(self.config.win_score));
                update.feedback = Some(FeedbackRequest::win(self.config.coin_feedback_ms));
            }
            RoundOutcome::TimedOut => {
                log::info!("round timed out at {} coins", self.round.score);
                self.phase = RoundPhase::TimedOut;
                update.notice = Some(TIMEOUT_NOTICE.to_string());
            }
        }
        update.phase = self.phase;
        update.outcome = Some(outcome);
        update
    }

    fn snapshot(&self, now_ms: u64) -> RoundUpdate {
        RoundUpdate {
            score: self.round.score,
            time_left_ms: self.clock.remaining(now_ms),
            phase: self.phase,
            outcome: None,
            notice: None,
            feedback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{COIN_FALLBACK, WIN_FALLBACK};
    use crate::storage::{MemoryStore, SavedProgress};

    fn controller() -> SessionController {
        let config = GameConfig {
            seed: Some(42),
            ..Default::default()
        };
        SessionController::new(config, SessionStore::new(MemoryStore::new()))
    }

    #[test]
    fn test_new_round_starts_playing_with_one_coin() {
        let mut session = controller();
        let update = session.start_new_round(0);

        assert_eq!(update.phase, RoundPhase::Playing);
        assert_eq!(update.score, 0);
        assert_eq!(update.time_left_ms, 60_000);
        assert!(session.coin().is_some());
    }

    #[test]
    fn test_new_round_writes_fresh_snapshot() {
        let mut session = controller();
        // Leftovers from an earlier run
        session.start_new_round(0);
        session.on_coin_collected(1_000);

        session.start_new_round(10_000);
        let saved = session_store_state(&session);
        assert_eq!(
            saved,
            Some(SavedProgress {
                score: 0,
                time_left_ms: 60_000
            })
        );
    }

    fn session_store_state(session: &SessionController) -> Option<SavedProgress> {
        session.store.load()
    }

    #[test]
    fn test_collection_increments_score_and_respawns() {
        let mut session = controller();
        session.start_new_round(0);
        let before = session.coin().unwrap();

        let update = session.on_coin_collected(2_000);

        assert_eq!(update.score, 1);
        let after = session.coin().unwrap();
        assert_ne!(before.id, after.id);
        // Progress saved with the post-collection score
        assert_eq!(
            session_store_state(&session),
            Some(SavedProgress {
                score: 1,
                time_left_ms: 58_000
            })
        );
        // Encouragement requested with the non-win fallback
        let feedback = update.feedback.unwrap();
        assert_eq!(feedback.fallback, COIN_FALLBACK);
    }

    #[test]
    fn test_collection_ignored_when_not_playing() {
        let mut session = controller();

        let update = session.on_coin_collected(0);
        assert_eq!(update.score, 0);
        assert_eq!(update.phase, RoundPhase::Idle);
        assert!(update.feedback.is_none());
    }

    #[test]
    fn test_score_stops_at_milestone() {
        let mut session = controller();
        session.start_new_round(0);

        let mut won_count = 0;
        for i in 0..15 {
            let update = session.on_coin_collected(100 * (i + 1));
            if update.outcome == Some(RoundOutcome::Won) {
                won_count += 1;
            }
        }

        assert_eq!(session.score(), 10);
        assert_eq!(won_count, 1);
        assert_eq!(session.phase(), RoundPhase::Won);
    }

    #[test]
    fn test_win_emits_notice_and_congratulation_request() {
        let mut session = controller();
        session.start_new_round(0);

        let mut last = None;
        for i in 0..10 {
            last = Some(session.on_coin_collected(100 * (i + 1)));
        }
        let update = last.unwrap();

        assert_eq!(update.outcome, Some(RoundOutcome::Won));
        assert_eq!(
            update.notice.as_deref(),
            Some("🎉 Congratulations! You collected 10 coins!")
        );
        assert_eq!(update.feedback.unwrap().fallback, WIN_FALLBACK);
        // Persisted session is gone the moment the round is won
        assert_eq!(session_store_state(&session), None);
    }

    #[test]
    fn test_continue_restores_score_and_clock() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.save(4, 30_000);

        let config = GameConfig {
            seed: Some(42),
            ..Default::default()
        };
        let mut session = SessionController::new(config, store);
        let update = session.continue_round(100_000);

        assert_eq!(update.phase, RoundPhase::Playing);
        assert_eq!(update.score, 4);
        assert_eq!(update.time_left_ms, 30_000);
    }

    #[test]
    fn test_continue_without_save_starts_fresh() {
        let mut session = controller();
        let update = session.continue_round(5_000);

        assert_eq!(update.phase, RoundPhase::Playing);
        assert_eq!(update.score, 0);
        assert_eq!(update.time_left_ms, 60_000);
    }

    #[test]
    fn test_timeout_below_milestone() {
        let mut session = controller();
        session.start_new_round(0);
        session.on_coin_collected(1_000);
        session.on_coin_collected(2_000);
        session.on_coin_collected(3_000);

        let update = session.on_tick(60_000);

        assert_eq!(update.outcome, Some(RoundOutcome::TimedOut));
        assert_eq!(update.phase, RoundPhase::TimedOut);
        assert_eq!(update.notice.as_deref(), Some(TIMEOUT_NOTICE));
        assert!(update.feedback.is_none());
        assert_eq!(session_store_state(&session), None);
    }

    #[test]
    fn test_collection_beats_expiry_in_same_instant() {
        let mut session = controller();
        session.start_new_round(0);
        for i in 0..9 {
            session.on_coin_collected(100 * (i + 1));
        }

        // Collection and expiry land on the same timestamp; the engine loop
        // applies collection first.
        let collected = session.on_coin_collected(60_000);
        assert_eq!(collected.outcome, Some(RoundOutcome::Won));

        let ticked = session.on_tick(60_000);
        assert_eq!(ticked.phase, RoundPhase::Won);
        assert_eq!(ticked.outcome, None);
    }

    #[test]
    fn test_expired_tick_at_milestone_never_times_out() {
        let mut session = controller();
        session.start_new_round(0);
        for i in 0..10 {
            session.on_coin_collected(100 * (i + 1));
        }
        assert_eq!(session.phase(), RoundPhase::Won);

        let update = session.on_tick(60_000);
        assert_ne!(update.phase, RoundPhase::TimedOut);
    }

    #[test]
    fn test_autosave_at_one_hertz() {
        let mut session = controller();
        session.start_new_round(0);
        session.on_tick(400);

        // Not yet due: the start-of-round snapshot still stands
        assert_eq!(
            session_store_state(&session),
            Some(SavedProgress {
                score: 0,
                time_left_ms: 60_000
            })
        );

        session.on_tick(1_000);
        assert_eq!(
            session_store_state(&session),
            Some(SavedProgress {
                score: 0,
                time_left_ms: 59_000
            })
        );
    }

    #[test]
    fn test_terminal_phase_returns_to_idle_after_dwell() {
        let mut session = controller();
        session.start_new_round(0);
        session.on_tick(60_000); // TimedOut, 2000 ms dwell

        let still = session.on_tick(61_500);
        assert_eq!(still.phase, RoundPhase::TimedOut);

        let done = session.on_tick(62_000);
        assert_eq!(done.phase, RoundPhase::Idle);
        assert!(session.coin().is_none());
    }

    #[test]
    fn test_win_dwell_is_longer_than_timeout_dwell() {
        let mut session = controller();
        session.start_new_round(0);
        for i in 0..10 {
            session.on_coin_collected(100 * (i + 1));
        }

        let still = session.on_tick(1_000 + 2_999);
        assert_eq!(still.phase, RoundPhase::Won);

        let done = session.on_tick(1_000 + 3_000);
        assert_eq!(done.phase, RoundPhase::Idle);
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut session = controller();
        session.start_new_round(0);
        session.on_tick(60_000);
        assert_eq!(session.phase(), RoundPhase::TimedOut);

        let update = session.reset(70_000);
        assert_eq!(update.phase, RoundPhase::Playing);
        assert_eq!(update.score, 0);
        assert_eq!(update.time_left_ms, 60_000);
    }

    #[test]
    fn test_collection_after_timeout_is_dropped() {
        let mut session = controller();
        session.start_new_round(0);
        session.on_tick(60_000);

        let update = session.on_coin_collected(60_001);
        assert_eq!(update.score, 0);
        assert_eq!(session_store_state(&session), None);
    }
}
