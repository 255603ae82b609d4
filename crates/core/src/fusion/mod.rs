//! Subscribers run synchronously inside `ingest` and must not call back
//! into the engine.

mod score;

use crate::emotion::{EmotionChange, EmotionSample, FusedEmotionState};
use crate::util::{Clock, RingBuffer, SystemClock};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub use score::fuse;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_NEUTRAL_EXIT_THRESHOLD: f64 = 0.5;

const LOG_TARGET: &str = "fusion";

#[derive(Clone, Debug, PartialEq)]
pub struct FusionConfig {
    /// Trailing interval, ending at ingestion time, over which samples are scored.
    pub window: Duration,
    pub history_capacity: usize,
    pub change_threshold: f64,
    pub neutral_exit_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            neutral_exit_threshold: DEFAULT_NEUTRAL_EXIT_THRESHOLD,
        }
    }
}

pub type Subscriber = Box<dyn FnMut(&EmotionChange) + Send>;

pub struct FusionEngine {
    config: FusionConfig,
    clock: Arc<dyn Clock>,
    history: RingBuffer<EmotionSample>,
    current: FusedEmotionState,
    subscribers: Vec<Subscriber>,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: FusionConfig, clock: impl Clock + 'static) -> Self {
        let history = RingBuffer::new(config.history_capacity.max(1));
        Self {
            config,
            clock: Arc::new(clock),
            history,
            current: FusedEmotionState::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&EmotionChange) + Send + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn ingest(&mut self, sample: EmotionSample) -> Option<EmotionChange> {
        let source = sample.source();
        if let Some(evicted) = self.history.push(sample) {
            tracing::trace!(target: LOG_TARGET, emotion = %evicted.emotion(), "history full, evicted oldest sample");
        }

        let now = self.clock.now();
        let window = self.config.window;
        let in_window = self.history.iter().filter(|s| {
            // Samples stamped after `now` count as current.
            match now.signed_duration_since(s.timestamp()).to_std() {
                Ok(age) => age < window,
                Err(_) => true,
            }
        });

        let candidate = fuse(in_window)?;
        tracing::debug!(
            target: LOG_TARGET,
            candidate = %candidate.state,
            confidence = candidate.confidence,
            current = %self.current.state,
            "fused window"
        );

        if !self.should_update(&candidate) {
            return None;
        }

        self.current = candidate;
        let change = EmotionChange {
            state: candidate,
            source,
        };
        tracing::info!(
            target: LOG_TARGET,
            state = %change.state.state,
            confidence = change.state.confidence,
            source = %source,
            "emotion changed"
        );
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&change);
        }
        Some(change)
    }

    pub fn should_update(&self, candidate: &FusedEmotionState) -> bool {
        if candidate.state == self.current.state {
            return false;
        }
        if candidate.confidence > self.config.change_threshold {
            return true;
        }
        self.current.state == crate::emotion::Emotion::Neutral
            && candidate.confidence > self.config.neutral_exit_threshold
    }

    pub fn current(&self) -> FusedEmotionState {
        self.current
    }

    pub fn history(&self) -> Vec<EmotionSample> {
        self.history.to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.current = FusedEmotionState::default();
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}
