use crate::emotion::{Emotion, EmotionSample, EmotionSource};
use chrono::{DateTime, Utc};
use serde::Serialize;

const POSITIVE: [&str; 10] = [
    "happy", "joy", "excited", "great", "wonderful", "love", "amazing", "good", "awesome",
    "excellent",
];
const NEGATIVE: [&str; 10] = [
    "sad", "angry", "hate", "terrible", "awful", "bad", "upset", "mad", "frustrated",
    "disappointed",
];
const ANXIOUS: [&str; 5] = ["worried", "anxious", "nervous", "stressed", "concerned"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextEmotion {
    pub emotion: Emotion,
    pub confidence: f64,
    pub score: i32,
    pub keywords: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordTextClassifier;

impl KeywordTextClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> TextEmotion {
        let lower = text.to_lowercase();
        let mut positive = 0;
        let mut negative = 0;
        let mut anxious = 0;
        let mut keywords: Vec<String> = Vec::new();

        for word in lower.split_whitespace() {
            let hit = if POSITIVE.contains(&word) {
                positive += 1;
                true
            } else if NEGATIVE.contains(&word) {
                negative += 1;
                true
            } else if ANXIOUS.contains(&word) {
                anxious += 1;
                true
            } else {
                false
            };
            if hit && !keywords.iter().any(|k| k == word) {
                keywords.push(word.to_owned());
            }
        }

        let (emotion, confidence) = if anxious > 0 {
            (Emotion::Anxious, 0.8)
        } else if positive > negative {
            (Emotion::Happy, (0.7 + f64::from(positive) * 0.05).min(0.95))
        } else if negative > positive {
            (Emotion::Sad, (0.65 + f64::from(negative) * 0.05).min(0.9))
        } else if text.contains('!') {
            (Emotion::Excited, 0.75)
        } else if lower.contains("calm") || lower.contains("relax") {
            (Emotion::Calm, 0.8)
        } else {
            (Emotion::Neutral, 0.7)
        };

        TextEmotion {
            emotion,
            confidence,
            score: positive - negative,
            keywords,
        }
    }

    pub fn sample(&self, text: &str, at: DateTime<Utc>) -> EmotionSample {
        let result = self.classify(text);
        EmotionSample::new(result.emotion, result.confidence, EmotionSource::Textual, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_words_raise_confidence() {
        let c = KeywordTextClassifier::new();
        let r = c.classify("I feel good and happy today");
        assert_eq!(r.emotion, Emotion::Happy);
        assert!((r.confidence - 0.8).abs() < 1e-9);
        assert_eq!(r.score, 2);
        assert_eq!(r.keywords, vec!["good", "happy"]);
    }

    #[test]
    fn anxiety_takes_precedence() {
        let r = KeywordTextClassifier.classify("great but worried");
        assert_eq!(r.emotion, Emotion::Anxious);
        assert_eq!(r.confidence, 0.8);
    }

    #[test]
    fn negative_and_caps() {
        let r = KeywordTextClassifier.classify("sad bad awful terrible upset mad hate");
        assert_eq!(r.emotion, Emotion::Sad);
        assert_eq!(r.confidence, 0.9);
        assert_eq!(r.score, -7);
    }

    #[test]
    fn punctuation_and_calm_fallbacks() {
        assert_eq!(KeywordTextClassifier.classify("no way!").emotion, Emotion::Excited);
        assert_eq!(KeywordTextClassifier.classify("let's relax a bit").emotion, Emotion::Calm);
        let r = KeywordTextClassifier.classify("the weather is okay");
        assert_eq!((r.emotion, r.confidence), (Emotion::Neutral, 0.7));
    }

    #[test]
    fn sample_is_textual() {
        let s = KeywordTextClassifier.sample("so excited", DateTime::<Utc>::default());
        assert_eq!(s.source(), EmotionSource::Textual);
        assert_eq!(s.emotion(), Emotion::Happy);
    }
}
