use crate::emotion::{Emotion, EmotionSample, FusedEmotionState};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

const SCORE_EPSILON: f64 = 1e-9;

struct Tally {
    score: f64,
    best_priority: u8,
    earliest: DateTime<Utc>,
}

impl Tally {
    fn rank(&self, other: &Tally) -> Ordering {
        if (self.score - other.score).abs() > SCORE_EPSILON {
            return self.score.total_cmp(&other.score);
        }
        other
            .best_priority
            .cmp(&self.best_priority)
            .then_with(|| other.earliest.cmp(&self.earliest))
    }
}

/// Ties go to the higher-priority source, then the earliest sample, then
/// declaration order.
pub fn fuse<'a, I>(samples: I) -> Option<FusedEmotionState>
where
    I: IntoIterator<Item = &'a EmotionSample>,
{
    let mut tallies: BTreeMap<Emotion, Tally> = BTreeMap::new();
    let mut seen = false;

    for sample in samples {
        seen = true;
        let source = sample.source();
        let entry = tallies.entry(sample.emotion()).or_insert_with(|| Tally {
            score: 0.0,
            best_priority: source.priority(),
            earliest: sample.timestamp(),
        });
        entry.score += source.weight() * sample.confidence();
        entry.best_priority = entry.best_priority.min(source.priority());
        entry.earliest = entry.earliest.min(sample.timestamp());
    }

    if !seen {
        return None;
    }

    let mut best: Option<(Emotion, &Tally)> = None;
    for (emotion, tally) in &tallies {
        if tally.score <= 0.0 {
            continue;
        }
        match best {
            Some((_, current)) if tally.rank(current) != Ordering::Greater => {}
            _ => best = Some((*emotion, tally)),
        }
    }

    Some(match best {
        Some((emotion, tally)) => FusedEmotionState::new(emotion, round2(tally.score.min(1.0))),
        None => FusedEmotionState::default(),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
