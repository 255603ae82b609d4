#[cfg(feature = "http-store")]
mod http;
mod memory;

use crate::analytics::distribution;
use crate::config::SessionId;
use crate::emotion::{clamp_unit, Emotion, EmotionSample};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "http-store")]
pub use http::HttpSummaryStore;
pub use memory::InMemorySummaryStore;

const NEUTRAL_EMPATHY: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub emotion: Emotion,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<&EmotionSample> for TimelineEntry {
    fn from(s: &EmotionSample) -> Self {
        Self {
            emotion: s.emotion(),
            confidence: s.confidence(),
            timestamp: s.timestamp(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionTimeline {
    pub emotions: Vec<TimelineEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmotionSummary {
    pub session_id: SessionId,
    pub emotion_timeline: EmotionTimeline,
    pub empathy_score: f64,
}

impl EmotionSummary {
    pub fn from_history(session_id: SessionId, history: &[EmotionSample]) -> Self {
        let emotions: Vec<TimelineEntry> = history.iter().map(TimelineEntry::from).collect();
        let empathy_score = empathy_score(emotions.iter().map(|e| e.emotion));
        Self {
            session_id,
            emotion_timeline: EmotionTimeline { emotions },
            empathy_score,
        }
    }

    pub fn digest(&self) -> SummaryDigest {
        let emotions = &self.emotion_timeline.emotions;
        SummaryDigest {
            session_id: self.session_id.clone(),
            total_emotions: emotions.len(),
            emotion_distribution: distribution(emotions.iter().map(|e| e.emotion)),
            average_empathy: self.empathy_score,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryDigest {
    pub session_id: SessionId,
    pub total_emotions: usize,
    pub emotion_distribution: BTreeMap<Emotion, usize>,
    pub average_empathy: f64,
}

pub fn empathy_weight(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Happy => 0.9,
        Emotion::Surprised => 0.8,
        Emotion::Neutral => 0.5,
        Emotion::Fearful => 0.4,
        Emotion::Sad | Emotion::Disgusted => 0.3,
        Emotion::Angry => 0.2,
        _ => NEUTRAL_EMPATHY,
    }
}

pub fn empathy_score(emotions: impl IntoIterator<Item = Emotion>) -> f64 {
    let (sum, n) = emotions
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), e| (sum + empathy_weight(e), n + 1));
    if n == 0 {
        return NEUTRAL_EMPATHY;
    }
    clamp_unit(sum / n as f64)
}

#[derive(thiserror::Error, Debug)]
pub enum SummaryError {
    #[error("summary store request failed: {0}")]
    Transport(String),
    #[error("summary store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("summary store response could not be decoded: {0}")]
    Decode(String),
    #[error("summary store is in safe mode, nothing was written")]
    SafeMode,
}

impl SummaryError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SummaryError::Transport(_) => true,
            SummaryError::Status { status, .. } => crate::util::is_http_retryable(*status),
            SummaryError::Decode(_) | SummaryError::SafeMode => false,
        }
    }
}

pub trait SummaryStore: Send + Sync {
    fn upsert(&self, summary: EmotionSummary) -> BoxFuture<'_, Result<(), SummaryError>>;

    fn fetch(&self, session_id: &SessionId)
        -> BoxFuture<'_, Result<Option<SummaryDigest>, SummaryError>>;
}
