use crate::emotion::{EmotionSample, EmotionSource};
use crate::enhancer::{EmotionEnhancer, EnhanceError};
use futures::future::BoxFuture;
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

pub struct JitterEnhancer {
    rng: Mutex<StdRng>,
}

impl JitterEnhancer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn floor_for(source: EmotionSource) -> Option<f64> {
        match source {
            EmotionSource::Facial => Some(0.9),
            EmotionSource::Vocal => Some(0.85),
            EmotionSource::Textual | EmotionSource::Unknown => None,
        }
    }
}

impl Default for JitterEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionEnhancer for JitterEnhancer {
    fn enhance(&self, sample: EmotionSample) -> BoxFuture<'_, Result<EmotionSample, EnhanceError>> {
        async move {
            let Some(floor) = Self::floor_for(sample.source()) else {
                return Ok(sample);
            };
            let factor: f64 = self.rng.lock().await.random_range(floor..1.0);
            let confidence = (sample.confidence() * factor * 100.0).round() / 100.0;
            Ok(sample.with_confidence(confidence))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::Emotion;
    use chrono::{DateTime, Utc};

    fn sample(source: EmotionSource) -> EmotionSample {
        EmotionSample::new(Emotion::Happy, 0.8, source, DateTime::<Utc>::default())
    }

    #[tokio::test]
    async fn facial_confidence_shrinks_slightly() {
        let enhancer = JitterEnhancer::with_seed(7);
        for _ in 0..50 {
            let out = enhancer.enhance(sample(EmotionSource::Facial)).await.unwrap();
            assert!(out.confidence() >= 0.72 && out.confidence() <= 0.8);
            assert_eq!(out.emotion(), Emotion::Happy);
        }
    }

    #[tokio::test]
    async fn vocal_uses_wider_range() {
        let enhancer = JitterEnhancer::with_seed(11);
        for _ in 0..50 {
            let out = enhancer.enhance(sample(EmotionSource::Vocal)).await.unwrap();
            assert!(out.confidence() >= 0.68 && out.confidence() <= 0.8);
        }
    }

    #[tokio::test]
    async fn textual_untouched() {
        let enhancer = JitterEnhancer::with_seed(3);
        let out = enhancer.enhance(sample(EmotionSource::Textual)).await.unwrap();
        assert_eq!(out.confidence(), 0.8);
    }
}
