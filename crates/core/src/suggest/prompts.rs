use crate::emotion::Emotion;

pub(super) const SYMPATHETIC: [&str; 3] = [
    "I can see this is tough for you. Would you like to talk more about it?",
    "I'm here to listen. Take your time.",
    "That sounds really difficult. How can I support you right now?",
];

pub(super) const DE_ESCALATION: [&str; 2] = [
    "I hear your frustration. Let's work through this together.",
    "I can see you're upset. Would it help to take a moment?",
];

pub(super) const AFFIRMING: [&str; 1] =
    ["I'm glad to see you're feeling positive! What's making you happy today?"];

pub(super) const CLARIFYING: [&str; 2] = [
    "That's an interesting question. Let me think about that...",
    "I understand you're looking for information. Let me help with that.",
];

pub(super) const EMPHASIS: [&str; 1] = ["I can see this is important to you."];

pub(super) const GENERIC: [&str; 3] = [
    "I understand. Please tell me more.",
    "That's interesting. Could you elaborate?",
    "I'm here to listen. What else is on your mind?",
];

pub(super) fn context_notes(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Happy => &[
            "User appears to be in a positive mood",
            "Continue the conversation positively",
        ],
        Emotion::Sad => &["User seems to be feeling down", "Show empathy and support"],
        Emotion::Angry => &[
            "User appears frustrated or upset",
            "Remain calm and understanding",
            "Avoid confrontational language",
        ],
        Emotion::Surprised => &["User seems surprised", "Acknowledge the surprise"],
        Emotion::Neutral => &[
            "User's emotional state is neutral",
            "Continue the conversation naturally",
        ],
        _ => &[],
    }
}

pub(super) fn replies(emotion: Emotion) -> &'static [&'static str; 2] {
    match emotion {
        Emotion::Happy => &["That's great to hear!", "I'm glad you're feeling good!"],
        Emotion::Sad => &[
            "I'm sorry to hear that. Would you like to talk about it?",
            "That sounds tough. I'm here to listen.",
        ],
        Emotion::Angry => &[
            "I can see you're upset. Let's work through this together.",
            "That sounds frustrating. What's bothering you?",
        ],
        _ => &["I see. Tell me more.", "Thanks for sharing."],
    }
}
