use crate::emotion::{Emotion, FusedEmotionState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_STRESS_THRESHOLD: f64 = 0.7;
pub const DEFAULT_SUSTAIN: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MindfulnessPrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub exercise: &'static str,
}

impl MindfulnessPrompt {
    pub fn breathing() -> Self {
        Self {
            title: "Mindfulness Break",
            message: "You seem a bit stressed. Take a deep breath and try this quick exercise:",
            exercise: "Breathe in for 4 seconds, hold for 4 seconds, exhale for 6 seconds. Repeat 3 times.",
        }
    }
}

/// Raises a single prompt once the user has looked anxious for long enough.
#[derive(Clone, Debug)]
pub struct StressMonitor {
    threshold: f64,
    sustain: Duration,
    stressed_since: Option<DateTime<Utc>>,
    prompt_active: bool,
}

impl StressMonitor {
    pub fn new(threshold: f64, sustain: Duration) -> Self {
        Self {
            threshold,
            sustain,
            stressed_since: None,
            prompt_active: false,
        }
    }

    pub fn observe(&mut self, state: &FusedEmotionState, at: DateTime<Utc>) -> Option<MindfulnessPrompt> {
        let stressed = state.state == Emotion::Anxious && state.confidence > self.threshold;
        if !stressed {
            self.stressed_since = None;
            return None;
        }

        let Some(since) = self.stressed_since else {
            self.stressed_since = Some(at);
            return None;
        };

        let sustained = at
            .signed_duration_since(since)
            .to_std()
            .map(|elapsed| elapsed > self.sustain)
            .unwrap_or(false);
        if sustained && !self.prompt_active {
            self.prompt_active = true;
            tracing::info!(target: "wellbeing", since = %since, "sustained stress, prompting break");
            return Some(MindfulnessPrompt::breathing());
        }
        None
    }

    pub fn is_prompt_active(&self) -> bool {
        self.prompt_active
    }

    pub fn dismiss(&mut self) {
        self.prompt_active = false;
    }

    pub fn reset(&mut self) {
        self.stressed_since = None;
        self.prompt_active = false;
    }
}

impl Default for StressMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_STRESS_THRESHOLD, DEFAULT_SUSTAIN)
    }
}
