mod jitter;
mod keyword;

use crate::emotion::EmotionSample;
use futures::future::BoxFuture;
use futures::FutureExt;

pub use jitter::JitterEnhancer;
pub use keyword::{KeywordTextClassifier, TextEmotion};

#[derive(thiserror::Error, Debug)]
pub enum EnhanceError {
    #[error("enhancer backend unavailable: {0}")]
    Unavailable(String),
    #[error("enhancer returned an invalid result: {0}")]
    InvalidResult(String),
}

pub trait EmotionEnhancer: Send + Sync {
    fn enhance(&self, sample: EmotionSample) -> BoxFuture<'_, Result<EmotionSample, EnhanceError>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughEnhancer;

impl EmotionEnhancer for PassthroughEnhancer {
    fn enhance(&self, sample: EmotionSample) -> BoxFuture<'_, Result<EmotionSample, EnhanceError>> {
        async move { Ok(sample) }.boxed()
    }
}
