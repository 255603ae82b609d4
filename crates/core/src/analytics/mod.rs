use crate::conversation::ConversationTurn;
use crate::emotion::{Emotion, EmotionSample};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MAX_TOPICS: usize = 5;
pub const TREND_WINDOW: usize = 5;
const MIN_TOPIC_CHARS: usize = 5;
const STOPWORDS: [&str; 9] = ["the", "and", "you", "that", "have", "for", "with", "this", "are"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentTrend {
    Improving,
    Declining,
    Stable,
    /// Fewer than two samples to compare; not a trend of its own.
    Neutral,
}

impl fmt::Display for SentimentTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentTrend::Improving => "improving",
            SentimentTrend::Declining => "declining",
            SentimentTrend::Stable => "stable",
            SentimentTrend::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAnalysis {
    pub total_messages: usize,
    pub emotion_distribution: BTreeMap<Emotion, usize>,
    pub dominant_emotion: Emotion,
    pub conversation_topics: Vec<String>,
    pub sentiment_trend: SentimentTrend,
}

pub fn analyze(emotions: &[EmotionSample], conversation: &[ConversationTurn]) -> ConversationAnalysis {
    let emotion_distribution = distribution(emotions.iter().map(EmotionSample::emotion));
    ConversationAnalysis {
        total_messages: conversation.len(),
        dominant_emotion: dominant(&emotion_distribution),
        emotion_distribution,
        conversation_topics: topics(conversation),
        sentiment_trend: sentiment_trend(emotions),
    }
}

pub fn distribution(emotions: impl IntoIterator<Item = Emotion>) -> BTreeMap<Emotion, usize> {
    let mut counts = BTreeMap::new();
    for emotion in emotions {
        *counts.entry(emotion).or_insert(0) += 1;
    }
    counts
}

pub fn dominant(distribution: &BTreeMap<Emotion, usize>) -> Emotion {
    let mut best = Emotion::Neutral;
    let mut max = 0;
    for (&emotion, &count) in distribution {
        if count > max {
            max = count;
            best = emotion;
        }
    }
    best
}

pub fn topics(conversation: &[ConversationTurn]) -> Vec<String> {
    let mut found: Vec<String> = Vec::with_capacity(MAX_TOPICS);
    let words = conversation
        .iter()
        .flat_map(|turn| turn.content.split_whitespace())
        .map(str::to_lowercase);

    for word in words {
        if found.len() == MAX_TOPICS {
            break;
        }
        if word.chars().count() < MIN_TOPIC_CHARS || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        if !found.contains(&word) {
            found.push(word);
        }
    }
    found
}

pub fn sentiment_score(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Happy => 2.0,
        Emotion::Surprised => 1.0,
        Emotion::Sad => -1.0,
        Emotion::Fearful | Emotion::Disgusted => -1.5,
        Emotion::Angry => -2.0,
        _ => 0.0,
    }
}

pub fn sentiment_trend(emotions: &[EmotionSample]) -> SentimentTrend {
    if emotions.len() < 2 {
        return SentimentTrend::Neutral;
    }
    let recent = &emotions[emotions.len().saturating_sub(TREND_WINDOW)..];
    let total: f64 = recent.iter().map(|s| sentiment_score(s.emotion())).sum();
    let average = total / recent.len() as f64;

    if average > 0.5 {
        SentimentTrend::Improving
    } else if average < -0.5 {
        SentimentTrend::Declining
    } else {
        SentimentTrend::Stable
    }
}

pub fn insights(analysis: &ConversationAnalysis) -> Vec<String> {
    let mut out = Vec::new();
    match analysis.dominant_emotion {
        Emotion::Happy => {
            out.push("Your conversation has been mostly positive! Keep up the good energy!")
        }
        Emotion::Sad => out.push(
            "I noticed some sadness in the conversation. Would you like to talk about what's on your mind?",
        ),
        Emotion::Angry => out.push(
            "I sense some frustration. Remember to take deep breaths and approach things calmly.",
        ),
        _ => {}
    }
    match analysis.sentiment_trend {
        SentimentTrend::Improving => {
            out.push("The conversation has been getting more positive over time.")
        }
        SentimentTrend::Declining => {
            out.push("The conversation has taken a more negative turn recently.")
        }
        _ => {}
    }
    out.push("Try to maintain a balance between speaking and listening for better conversations.");
    out.push("Remember to take breaks during long conversations to reflect.");
    out.into_iter().map(String::from).collect()
}
