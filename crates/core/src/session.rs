//! Subscribers hear about a change first, then the suggestion engine, then
//! the stress monitor.

use crate::analytics::{self, ConversationAnalysis};
use crate::config::SessionId;
use crate::conversation::ConversationTurn;
use crate::emotion::{EmotionChange, EmotionSample, FusedEmotionState};
use crate::enhancer::{EmotionEnhancer, KeywordTextClassifier, PassthroughEnhancer};
use crate::fusion::FusionEngine;
use crate::suggest::{self, SuggestionEngine};
use crate::summary::EmotionSummary;
use crate::wellbeing::{MindfulnessPrompt, StressMonitor};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

const LOG_TARGET: &str = "session";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionUpdate {
    pub change: Option<EmotionChange>,
    pub mindfulness: Option<MindfulnessPrompt>,
}

pub struct Session {
    id: SessionId,
    fusion: FusionEngine,
    suggestions: SuggestionEngine,
    stress: StressMonitor,
    enhancer: Box<dyn EmotionEnhancer>,
    text_classifier: KeywordTextClassifier,
    rng: StdRng,
}

impl Session {
    pub fn new(id: SessionId, fusion: FusionEngine) -> Self {
        Self {
            id,
            fusion,
            suggestions: SuggestionEngine::new(),
            stress: StressMonitor::default(),
            enhancer: Box::new(PassthroughEnhancer),
            text_classifier: KeywordTextClassifier::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_enhancer(mut self, enhancer: impl EmotionEnhancer + 'static) -> Self {
        self.enhancer = Box::new(enhancer);
        self
    }

    pub fn with_reply_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_stress_monitor(mut self, stress: StressMonitor) -> Self {
        self.stress = stress;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&EmotionChange) + Send + 'static,
    {
        self.fusion.subscribe(subscriber);
    }

    pub fn ingest(&mut self, sample: EmotionSample) -> SessionUpdate {
        let change = self.fusion.ingest(sample);
        if let Some(change) = &change {
            self.suggestions.observe_change(change);
        }
        let mindfulness = self.stress.observe(&self.fusion.current(), self.fusion.now());
        SessionUpdate {
            change,
            mindfulness,
        }
    }

    pub async fn ingest_enhanced(&mut self, sample: EmotionSample) -> SessionUpdate {
        let sample = match self.enhancer.enhance(sample.clone()).await {
            Ok(enhanced) => enhanced,
            Err(e) => {
                tracing::warn!(target: LOG_TARGET, session_id = %self.id, error = %e, "enhancer failed, using raw sample");
                sample
            }
        };
        self.ingest(sample)
    }

    pub fn ingest_text(&mut self, text: &str) -> SessionUpdate {
        let sample = self.text_classifier.sample(text, self.fusion.now());
        self.ingest(sample)
    }

    pub fn append_turn(&mut self, turn: ConversationTurn) -> Vec<String> {
        self.suggestions.append_turn(turn)
    }

    pub fn respond(&mut self, at: DateTime<Utc>) -> ConversationTurn {
        let text = suggest::respond(self.fusion.current().state, &mut self.rng);
        let turn = ConversationTurn::assistant(text, at);
        self.suggestions.append_turn(turn.clone());
        turn
    }

    pub fn current(&self) -> FusedEmotionState {
        self.fusion.current()
    }

    pub fn history(&self) -> Vec<EmotionSample> {
        self.fusion.history()
    }

    pub fn conversation(&self) -> Vec<ConversationTurn> {
        self.suggestions.conversation()
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }

    pub fn analyze(&self) -> ConversationAnalysis {
        analytics::analyze(&self.fusion.history(), &self.suggestions.conversation())
    }

    pub fn summary(&self) -> EmotionSummary {
        EmotionSummary::from_history(self.id.clone(), &self.fusion.history())
    }

    pub fn dismiss_mindfulness(&mut self) {
        self.stress.dismiss();
    }

    pub fn stop(&mut self) {
        self.fusion.reset();
        self.suggestions.clear();
        self.stress.reset();
        tracing::info!(target: LOG_TARGET, session_id = %self.id, "session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{Emotion, EmotionSource};
    use crate::enhancer::EnhanceError;
    use crate::fusion::FusionConfig;
    use crate::util::ManualClock;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).expect("valid instant")
    }

    fn session() -> (Session, ManualClock) {
        let clock = ManualClock::new(at(0));
        let fusion = FusionEngine::with_clock(FusionConfig::default(), clock.clone());
        (Session::new(SessionId::new("test").unwrap(), fusion), clock)
    }

    fn facial(emotion: Emotion, confidence: f64, ms: i64) -> EmotionSample {
        EmotionSample::new(emotion, confidence, EmotionSource::Facial, at(ms))
    }

    struct FailingEnhancer;

    impl EmotionEnhancer for FailingEnhancer {
        fn enhance(&self, _sample: EmotionSample) -> BoxFuture<'_, Result<EmotionSample, EnhanceError>> {
            async { Err(EnhanceError::Unavailable("offline".into())) }.boxed()
        }
    }

    #[test]
    fn change_reaches_display_then_suggestions() {
        let (mut session, _) = session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |c| sink.lock().unwrap().push(c.state.state));

        session.ingest(facial(Emotion::Sad, 0.9, 0));
        let update = session.ingest(facial(Emotion::Sad, 0.9, 0));
        assert_eq!(update.change.map(|c| c.state.state), Some(Emotion::Sad));
        assert_eq!(*seen.lock().unwrap(), vec![Emotion::Sad]);

        let out = session.append_turn(ConversationTurn::user("hi", at(0)));
        assert!(out[0].starts_with("I can see this is tough"));
    }

    #[test]
    fn reply_matches_fused_state_and_is_recorded() {
        let (session, _) = session();
        let mut session = session.with_reply_seed(1);
        session.ingest(facial(Emotion::Angry, 1.0, 0));
        session.ingest(facial(Emotion::Angry, 1.0, 0));
        session.append_turn(ConversationTurn::user("this is broken", at(0)));

        let reply = session.respond(at(10));
        assert_eq!(reply.role, crate::conversation::Role::Assistant);
        assert!(
            reply.content == "I can see you're upset. Let's work through this together."
                || reply.content == "That sounds frustrating. What's bothering you?"
        );
        assert_eq!(session.conversation().last(), Some(&reply));
        assert_eq!(session.conversation().len(), 2);
    }

    #[test]
    fn reply_defaults_to_neutral_tone() {
        let (session, _) = session();
        let mut session = session.with_reply_seed(2);
        let reply = session.respond(at(0));
        assert!(["I see. Tell me more.", "Thanks for sharing."].contains(&reply.content.as_str()));
    }

    #[test]
    fn analysis_uses_raw_samples() {
        let (mut session, _) = session();
        for e in [Emotion::Happy, Emotion::Happy, Emotion::Happy, Emotion::Sad] {
            session.ingest(facial(e, 0.3, 0));
        }
        session.append_turn(ConversationTurn::user("I am happy and excited!", at(0)));

        let analysis = session.analyze();
        assert_eq!(analysis.dominant_emotion, Emotion::Happy);
        assert_eq!(analysis.total_messages, 1);
        assert_eq!(analysis.sentiment_trend, analytics::SentimentTrend::Improving);
        assert_eq!(analysis, session.analyze());
    }

    #[test]
    fn sustained_anxiety_prompts_once() {
        let (mut session, clock) = session();
        session.ingest(facial(Emotion::Anxious, 1.0, 0));
        session.ingest(facial(Emotion::Anxious, 1.0, 0));
        assert_eq!(session.current().state, Emotion::Anxious);

        clock.advance(Duration::from_millis(3500));
        let update = session.ingest(facial(Emotion::Anxious, 1.0, 3500));
        assert!(update.mindfulness.is_some());
        let again = session.ingest(facial(Emotion::Anxious, 1.0, 3600));
        assert!(again.mindfulness.is_none());
    }

    #[test]
    fn text_channel_feeds_fusion() {
        let (mut session, _) = session();
        session.ingest_text("I am so happy");
        session.ingest_text("what a wonderful and amazing day");
        let history = session.history();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|s| s.source() == EmotionSource::Textual));
        // two textual happy samples: 0.2 * (0.75 + 0.8) = 0.31, stays neutral
        assert_eq!(session.current().state, Emotion::Neutral);
    }

    #[tokio::test]
    async fn failing_enhancer_falls_back_to_raw_sample() {
        let (session, _) = session();
        let mut session = session.with_enhancer(FailingEnhancer);
        session.ingest_enhanced(facial(Emotion::Calm, 0.6, 0)).await;
        assert_eq!(session.history()[0].confidence(), 0.6);
    }

    #[test]
    fn summary_and_stop() {
        let (mut session, _) = session();
        session.ingest(facial(Emotion::Happy, 1.0, 0));
        session.ingest(facial(Emotion::Happy, 1.0, 0));
        let summary = session.summary();
        assert_eq!(summary.session_id.as_str(), "test");
        assert_eq!(summary.emotion_timeline.emotions.len(), 2);

        session.stop();
        assert!(session.history().is_empty());
        assert_eq!(session.current(), FusedEmotionState::default());
        assert!(session.conversation().is_empty());
    }
}
