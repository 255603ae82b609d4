mod prompts;

use crate::conversation::{ConversationTurn, Role};
use crate::emotion::{Emotion, EmotionChange};
use crate::util::RingBuffer;
use chrono::{DateTime, Utc};
use rand::Rng;

pub const MAX_SUGGESTIONS: usize = 3;
pub const RECENT_STATE_WINDOW: usize = 5;
pub const CONVERSATION_CAPACITY: usize = 20;
pub const CONTEXT_CAPACITY: usize = 10;

const LOG_TARGET: &str = "suggest";

/// `recent_states` is oldest first; only the last five are considered.
pub fn suggest(turn: &ConversationTurn, recent_states: &[Emotion]) -> Vec<String> {
    let skip = recent_states.len().saturating_sub(RECENT_STATE_WINDOW);
    let recent = &recent_states[skip..];
    let seen = |e: Emotion| recent.contains(&e);

    let mut out: Vec<&'static str> = Vec::with_capacity(MAX_SUGGESTIONS);
    if seen(Emotion::Sad) {
        out.extend(prompts::SYMPATHETIC);
    } else if seen(Emotion::Angry) {
        out.extend(prompts::DE_ESCALATION);
    } else if seen(Emotion::Happy) {
        out.extend(prompts::AFFIRMING);
    }

    if turn.content.contains('?') {
        out.extend(prompts::CLARIFYING);
    }
    if turn.content.contains('!') {
        out.extend(prompts::EMPHASIS);
    }
    if out.is_empty() {
        out.extend(prompts::GENERIC);
    }

    let mut suggestions: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
    for text in out {
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
        if !suggestions.iter().any(|s| s == text) {
            suggestions.push(text.to_owned());
        }
    }
    suggestions
}

pub fn respond<R: Rng>(state: Emotion, rng: &mut R) -> &'static str {
    let options = prompts::replies(state);
    options[rng.random_range(0..options.len())]
}

#[derive(Debug)]
pub struct SuggestionEngine {
    conversation: RingBuffer<ConversationTurn>,
    recent_states: RingBuffer<Emotion>,
    context: RingBuffer<&'static str>,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self {
            conversation: RingBuffer::new(CONVERSATION_CAPACITY),
            recent_states: RingBuffer::new(RECENT_STATE_WINDOW),
            context: RingBuffer::new(CONTEXT_CAPACITY),
        }
    }

    pub fn observe_change(&mut self, change: &EmotionChange) {
        let emotion = change.state.state;
        self.recent_states.push(emotion);
        for note in prompts::context_notes(emotion) {
            self.context.push(*note);
        }
    }

    pub fn append_turn(&mut self, turn: ConversationTurn) -> Vec<String> {
        let suggestions = match turn.role {
            Role::User => self.suggest_for(&turn),
            Role::Assistant => Vec::new(),
        };
        tracing::debug!(
            target: LOG_TARGET,
            role = %turn.role,
            count = suggestions.len(),
            "turn appended"
        );
        self.conversation.push(turn);
        suggestions
    }

    pub fn suggest_for(&self, turn: &ConversationTurn) -> Vec<String> {
        let recent: Vec<Emotion> = self.recent_states.iter().copied().collect();
        suggest(turn, &recent)
    }

    pub fn use_suggestion(&self, text: &str, role: Role, at: DateTime<Utc>) -> ConversationTurn {
        ConversationTurn::new(role, text, at)
    }

    pub fn current_emotion(&self) -> Emotion {
        self.recent_states.latest().copied().unwrap_or_default()
    }

    pub fn recent_states(&self) -> Vec<Emotion> {
        self.recent_states.to_vec()
    }

    pub fn conversation(&self) -> Vec<ConversationTurn> {
        self.conversation.to_vec()
    }

    pub fn context_notes(&self) -> Vec<&'static str> {
        self.context.to_vec()
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
        self.recent_states.clear();
        self.context.clear();
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionSource, FusedEmotionState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn user(text: &str) -> ConversationTurn {
        ConversationTurn::user(text, DateTime::<Utc>::default())
    }

    fn change(emotion: Emotion) -> EmotionChange {
        EmotionChange {
            state: FusedEmotionState::new(emotion, 0.8),
            source: EmotionSource::Facial,
        }
    }

    #[test]
    fn sad_fills_all_three_slots() {
        let out = suggest(&user("why is this happening?!"), &[Emotion::Sad]);
        assert_eq!(out, prompts::SYMPATHETIC.map(String::from).to_vec());
    }

    #[test]
    fn sad_anywhere_in_last_five_wins_over_angry() {
        let states = [Emotion::Sad, Emotion::Happy, Emotion::Angry, Emotion::Calm, Emotion::Angry];
        assert_eq!(suggest(&user("ok"), &states)[0], prompts::SYMPATHETIC[0]);
    }

    #[test]
    fn states_older_than_five_are_ignored() {
        let states = [
            Emotion::Sad,
            Emotion::Calm,
            Emotion::Calm,
            Emotion::Calm,
            Emotion::Calm,
            Emotion::Calm,
        ];
        assert_eq!(suggest(&user("ok"), &states), prompts::GENERIC.map(String::from).to_vec());
    }

    #[test]
    fn angry_then_question() {
        let out = suggest(&user("what now?"), &[Emotion::Angry]);
        assert_eq!(
            out,
            vec![
                prompts::DE_ESCALATION[0].to_owned(),
                prompts::DE_ESCALATION[1].to_owned(),
                prompts::CLARIFYING[0].to_owned(),
            ]
        );
    }

    #[test]
    fn happy_with_emphasis() {
        let out = suggest(&user("great news!"), &[Emotion::Happy]);
        assert_eq!(out, vec![prompts::AFFIRMING[0].to_owned(), prompts::EMPHASIS[0].to_owned()]);
    }

    #[test]
    fn punctuation_rules_without_emotion() {
        let out = suggest(&user("really? wow!"), &[]);
        assert_eq!(
            out,
            vec![
                prompts::CLARIFYING[0].to_owned(),
                prompts::CLARIFYING[1].to_owned(),
                prompts::EMPHASIS[0].to_owned(),
            ]
        );
    }

    #[test]
    fn falls_back_to_generic() {
        let out = suggest(&user("fine"), &[Emotion::Neutral]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], "I understand. Please tell me more.");
    }

    #[test]
    fn never_more_than_three_or_duplicates() {
        let inputs = ["?", "!", "?!", "plain", ""];
        for emotions in [vec![], vec![Emotion::Sad], vec![Emotion::Angry], vec![Emotion::Happy]] {
            for text in inputs {
                let out = suggest(&user(text), &emotions);
                assert!(!out.is_empty() && out.len() <= MAX_SUGGESTIONS);
                let mut dedup = out.clone();
                dedup.sort();
                dedup.dedup();
                assert_eq!(dedup.len(), out.len());
            }
        }
    }

    #[test]
    fn engine_tracks_changes_and_turns() {
        let mut engine = SuggestionEngine::new();
        engine.observe_change(&change(Emotion::Angry));
        assert_eq!(engine.current_emotion(), Emotion::Angry);
        assert_eq!(engine.context_notes().len(), 3);

        let out = engine.append_turn(user("this is broken"));
        assert_eq!(out[0], prompts::DE_ESCALATION[0]);

        let none = engine.append_turn(ConversationTurn::assistant("sorry!", DateTime::<Utc>::default()));
        assert!(none.is_empty());
        assert_eq!(engine.conversation().len(), 2);
    }

    #[test]
    fn conversation_is_bounded() {
        let mut engine = SuggestionEngine::new();
        for i in 0..25 {
            engine.append_turn(user(&format!("message {i}")));
        }
        let turns = engine.conversation();
        assert_eq!(turns.len(), CONVERSATION_CAPACITY);
        assert_eq!(turns[0].content, "message 5");
    }

    #[test]
    fn context_notes_roll_over() {
        let mut engine = SuggestionEngine::new();
        for e in [Emotion::Angry, Emotion::Sad, Emotion::Happy, Emotion::Angry] {
            engine.observe_change(&change(e));
        }
        let notes = engine.context_notes();
        assert_eq!(notes.len(), CONTEXT_CAPACITY);
        assert_eq!(notes.last(), Some(&"Avoid confrontational language"));
    }

    #[test]
    fn use_suggestion_builds_outgoing_turn() {
        let engine = SuggestionEngine::new();
        let turn = engine.use_suggestion("I'm here to listen.", Role::User, DateTime::<Utc>::default());
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "I'm here to listen.");
    }

    #[test]
    fn replies_follow_fused_state() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            assert!(prompts::replies(Emotion::Sad).contains(&respond(Emotion::Sad, &mut rng)));
            assert!(prompts::replies(Emotion::Happy).contains(&respond(Emotion::Happy, &mut rng)));
            assert!(prompts::replies(Emotion::Angry).contains(&respond(Emotion::Angry, &mut rng)));
        }
        assert_eq!(prompts::replies(Emotion::Happy)[0], "That's great to hear!");
    }

    #[test]
    fn unmapped_states_get_neutral_replies() {
        let mut rng = StdRng::seed_from_u64(9);
        let neutral = prompts::replies(Emotion::Neutral);
        for e in [Emotion::Anxious, Emotion::Calm, Emotion::Surprised, Emotion::Fearful] {
            assert_eq!(prompts::replies(e), neutral);
            assert!(neutral.contains(&respond(e, &mut rng)));
        }
    }
}
