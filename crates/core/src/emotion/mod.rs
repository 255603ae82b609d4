use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fearful,
    Disgusted,
    #[default]
    Neutral,
    Anxious,
    Calm,
    Excited,
}

impl Emotion {
    /// Every label, in declaration order. Anything that has to break a tie
    /// between emotions deterministically uses this order.
    pub const ALL: [Emotion; 10] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Neutral,
        Emotion::Anxious,
        Emotion::Calm,
        Emotion::Excited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Neutral => "neutral",
            Emotion::Anxious => "anxious",
            Emotion::Calm => "calm",
            Emotion::Excited => "excited",
        }
    }

    pub fn normalize(label: &str) -> Self {
        label.parse().unwrap_or(Emotion::Neutral)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Sad => "😢",
            Emotion::Angry => "😠",
            Emotion::Surprised => "😲",
            Emotion::Fearful => "😨",
            Emotion::Disgusted => "🤢",
            Emotion::Neutral => "😐",
            Emotion::Anxious => "😟",
            Emotion::Calm => "😌",
            Emotion::Excited => "🤩",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown emotion label: {0:?}")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == label)
            .ok_or_else(|| UnknownEmotion(s.to_owned()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionSource {
    Facial,
    Vocal,
    Textual,
    Unknown,
}

impl EmotionSource {
    pub fn weight(&self) -> f64 {
        match self {
            EmotionSource::Facial => 0.5,
            EmotionSource::Vocal => 0.3,
            EmotionSource::Textual => 0.2,
            EmotionSource::Unknown => 0.1,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            EmotionSource::Facial => 0,
            EmotionSource::Vocal => 1,
            EmotionSource::Textual => 2,
            EmotionSource::Unknown => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionSource::Facial => "facial",
            EmotionSource::Vocal => "vocal",
            EmotionSource::Textual => "textual",
            EmotionSource::Unknown => "unknown",
        }
    }

    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "facial" | "facial_analysis" | "face" => EmotionSource::Facial,
            "vocal" | "voice_analysis" | "voice" => EmotionSource::Vocal,
            "textual" | "text_analysis" | "text" => EmotionSource::Textual,
            _ => EmotionSource::Unknown,
        }
    }
}

impl fmt::Display for EmotionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One raw observation from a detector. Confidence is always within [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SampleRecord")]
pub struct EmotionSample {
    emotion: Emotion,
    confidence: f64,
    source: EmotionSource,
    timestamp: DateTime<Utc>,
}

impl EmotionSample {
    pub fn new(
        emotion: Emotion,
        confidence: f64,
        source: EmotionSource,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            emotion,
            confidence: clamp_unit(confidence),
            source,
            timestamp,
        }
    }

    pub fn from_labels(
        emotion: &str,
        confidence: f64,
        source: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            Emotion::normalize(emotion),
            confidence,
            EmotionSource::normalize(source),
            timestamp,
        )
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn source(&self) -> EmotionSource {
        self.source
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }
}

#[derive(Deserialize)]
struct SampleRecord {
    emotion: String,
    confidence: f64,
    source: String,
    timestamp: DateTime<Utc>,
}

impl From<SampleRecord> for EmotionSample {
    fn from(r: SampleRecord) -> Self {
        EmotionSample::from_labels(&r.emotion, r.confidence, &r.source, r.timestamp)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusedEmotionState {
    pub state: Emotion,
    pub confidence: f64,
}

impl FusedEmotionState {
    pub fn new(state: Emotion, confidence: f64) -> Self {
        Self {
            state,
            confidence: clamp_unit(confidence),
        }
    }
}

impl Default for FusedEmotionState {
    fn default() -> Self {
        Self {
            state: Emotion::Neutral,
            confidence: 0.0,
        }
    }
}

impl fmt::Display for FusedEmotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}%)",
            self.state.emoji(),
            self.state,
            (self.confidence * 100.0).round()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmotionChange {
    #[serde(flatten)]
    pub state: FusedEmotionState,
    pub source: EmotionSource,
}
