use crate::config::SessionId;
use crate::conversation::{ConversationTurn, Role};
use crate::emotion::{EmotionChange, EmotionSample};
use crate::enhancer::EmotionEnhancer;
use crate::fusion::{FusionConfig, FusionEngine};
use crate::session::Session;
use crate::util::{Clock, ManualClock};
use crate::wellbeing::MindfulnessPrompt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplayEvent {
    Sample {
        emotion: String,
        confidence: f64,
        source: String,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    Text {
        content: String,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    Turn {
        role: Role,
        content: String,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplayOutput {
    Change(EmotionChange),
    Suggestions { suggestions: Vec<String> },
    Response { content: String },
    Mindfulness(MindfulnessPrompt),
}

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

/// Parses JSON-lines input. Blank lines and `#` comments are skipped; the
/// first malformed line aborts with its 1-based line number.
pub fn parse_events(input: &str) -> Result<Vec<ReplayEvent>, ReplayError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, l)| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('#')
        })
        .map(|(i, l)| {
            serde_json::from_str(l).map_err(|source| ReplayError::Parse { line: i + 1, source })
        })
        .collect()
}

pub struct Replayer {
    session: Session,
    clock: ManualClock,
}

impl Replayer {
    pub fn new(session_id: SessionId, fusion: FusionConfig, start: DateTime<Utc>) -> Self {
        let clock = ManualClock::new(start);
        let engine = FusionEngine::with_clock(fusion, clock.clone());
        Self {
            session: Session::new(session_id, engine),
            clock,
        }
    }

    pub fn with_enhancer(mut self, enhancer: impl EmotionEnhancer + 'static) -> Self {
        self.session = self.session.with_enhancer(enhancer);
        self
    }

    fn stamp(&self, timestamp: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match timestamp {
            Some(t) => {
                self.clock.set(t);
                t
            }
            None => self.clock.now(),
        }
    }

    pub async fn apply(&mut self, event: ReplayEvent) -> Vec<ReplayOutput> {
        let mut out = Vec::new();
        match event {
            ReplayEvent::Sample {
                emotion,
                confidence,
                source,
                timestamp,
            } => {
                let at = self.stamp(timestamp);
                let sample = EmotionSample::from_labels(&emotion, confidence, &source, at);
                let update = self.session.ingest_enhanced(sample).await;
                out.extend(update.change.map(ReplayOutput::Change));
                out.extend(update.mindfulness.map(ReplayOutput::Mindfulness));
            }
            ReplayEvent::Text { content, timestamp } => {
                self.stamp(timestamp);
                let update = self.session.ingest_text(&content);
                out.extend(update.change.map(ReplayOutput::Change));
                out.extend(update.mindfulness.map(ReplayOutput::Mindfulness));
            }
            ReplayEvent::Turn {
                role,
                content,
                timestamp,
            } => {
                let at = self.stamp(timestamp);
                let suggestions = self.session.append_turn(ConversationTurn::new(role, content, at));
                if !suggestions.is_empty() {
                    out.push(ReplayOutput::Suggestions { suggestions });
                }
                if role == Role::User {
                    let reply = self.session.respond(at);
                    out.push(ReplayOutput::Response {
                        content: reply.content,
                    });
                }
            }
        }
        out
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}
