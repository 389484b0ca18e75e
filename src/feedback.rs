//! AI feedback pipeline and on-screen message display
//!
//! Coin pickups and round wins trigger a short generated message from an
//! external text service. The pipeline is strictly fire-and-forget: requests
//! are handed to a worker thread, the game loop polls for resolved text, and
//! nothing in this module can touch score, round, or persisted state. A
//! response landing after the round ended just displays late (or expires);
//! it can never corrupt a subsequent round.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::FeedbackConfig;

/// Prompt sent after an ordinary coin pickup.
pub const COIN_PROMPT: &str =
    "Say something short, encouraging or funny when the player collects a coin in a video game.";

/// Prompt sent when the player reaches the winning score.
pub const WIN_PROMPT: &str = "Say 'Congratulations! You are won!' in a fun way.";

/// Shown when the service fails on a coin pickup.
pub const COIN_FALLBACK: &str = "Well done!";

/// Shown when the service fails on the winning pickup.
pub const WIN_FALLBACK: &str = "Congratulations! You are won!";

/// One feedback request, with its fallback chosen at call time.
///
/// The win/non-win fallback is captured here by the controller when the
/// event happens and is never recomputed after the request resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub prompt: String,
    pub fallback: String,
    pub display_ms: u64,
}

impl FeedbackRequest {
    /// Encouragement request for a coin pickup below the milestone.
    pub fn coin(display_ms: u64) -> Self {
        Self {
            prompt: COIN_PROMPT.to_string(),
            fallback: COIN_FALLBACK.to_string(),
            display_ms,
        }
    }

    /// Congratulation request for the winning pickup.
    pub fn win(display_ms: u64) -> Self {
        Self {
            prompt: WIN_PROMPT.to_string(),
            fallback: WIN_FALLBACK.to_string(),
            display_ms,
        }
    }
}

/// Why a service call produced no usable text.
#[derive(Debug)]
pub enum ServiceError {
    /// Transport-level failure (connect, timeout, TLS, ...)
    Request(String),
    /// Non-success HTTP status
    Status(u16),
    /// Response body did not contain a candidate text
    Malformed,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Request(err) => write!(f, "request failed: {}", err),
            ServiceError::Status(code) => write!(f, "service returned status {}", code),
            ServiceError::Malformed => write!(f, "service response had no candidate text"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// A text generation backend.
///
/// Implementations run on the pipeline worker thread, so blocking here never
/// stalls the game loop.
pub trait TextService: Send + 'static {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

// Wire types for the generative endpoint:
// request  { contents: [{ parts: [{ text }] }] }
// response { candidates: [{ content: { parts: [{ text }] } }] }

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// HTTP client for the generative text endpoint.
pub struct GenerativeTextService {
    client: reqwest::blocking::Client,
    url: String,
}

impl GenerativeTextService {
    /// Build a client with the configured endpoint, key, and timeout.
    pub fn new(config: &FeedbackConfig) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| ServiceError::Request(err.to_string()))?;
        let url = if config.api_key.is_empty() {
            config.endpoint.clone()
        } else {
            format!("{}?key={}", config.endpoint, config.api_key)
        };
        Ok(Self { client, url })
    }
}

impl TextService for GenerativeTextService {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|err| ServiceError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().map_err(|_| ServiceError::Malformed)?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::Malformed)
    }
}

/// Text that came back from the pipeline, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeedback {
    pub text: String,
    pub display_ms: u64,
}

/// Fire-and-forget request/response flow to a [`TextService`].
///
/// `request` enqueues and returns immediately; a worker thread resolves each
/// request to generated text or its fallback, and the game loop drains the
/// results with `poll` on its own schedule.
pub struct FeedbackPipeline {
    req_tx: Sender<FeedbackRequest>,
    res_rx: Receiver<ResolvedFeedback>,
}

impl FeedbackPipeline {
    pub fn new(service: impl TextService) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<FeedbackRequest>();
        let (res_tx, res_rx) = mpsc::channel();

        thread::spawn(move || {
            for req in req_rx {
                let text = match service.generate(&req.prompt) {
                    Ok(text) => {
                        log::debug!("feedback service says: {}", text);
                        text
                    }
                    Err(err) => {
                        log::warn!("feedback service failed ({}), using fallback", err);
                        req.fallback
                    }
                };
                let resolved = ResolvedFeedback {
                    text,
                    display_ms: req.display_ms,
                };
                if res_tx.send(resolved).is_err() {
                    break;
                }
            }
        });

        Self { req_tx, res_rx }
    }

    /// Enqueue a request. Never blocks; if the worker is gone the request is
    /// dropped and logged.
    pub fn request(&self, req: FeedbackRequest) {
        if self.req_tx.send(req).is_err() {
            log::warn!("feedback worker is gone, dropping request");
        }
    }

    /// Take every resolved message that has arrived since the last poll.
    pub fn poll(&self) -> Vec<ResolvedFeedback> {
        self.res_rx.try_iter().collect()
    }
}

/// A message currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub text: String,
    pub display_until_ms: u64,
}

/// Display-layer view model for feedback text and round notices.
///
/// Owned by the render layer; holds no handle to the session, so late
/// pipeline responses can only ever add ephemeral text here.
#[derive(Debug, Default)]
pub struct MessageBoard {
    messages: Vec<FeedbackMessage>,
}

impl MessageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` until `now_ms + display_ms`.
    pub fn post(&mut self, text: impl Into<String>, now_ms: u64, display_ms: u64) {
        self.messages.push(FeedbackMessage {
            text: text.into(),
            display_until_ms: now_ms + display_ms,
        });
    }

    /// Move resolved pipeline messages onto the board.
    pub fn pump(&mut self, pipeline: &FeedbackPipeline, now_ms: u64) {
        for resolved in pipeline.poll() {
            self.post(resolved.text, now_ms, resolved.display_ms);
        }
    }

    /// Drop messages whose display window has passed.
    pub fn update(&mut self, now_ms: u64) {
        self.messages.retain(|m| m.display_until_ms > now_ms);
    }

    /// Messages currently visible.
    pub fn active(&self) -> &[FeedbackMessage] {
        &self.messages
    }
}
