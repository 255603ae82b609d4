use crate::config::SessionId;
use crate::summary::{EmotionSummary, SummaryDigest, SummaryError, SummaryStore};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default)]
pub struct InMemorySummaryStore {
    records: Arc<RwLock<HashMap<SessionId, EmotionSummary>>>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &SessionId) -> Option<EmotionSummary> {
        self.records.read().await.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl SummaryStore for InMemorySummaryStore {
    fn upsert(&self, summary: EmotionSummary) -> BoxFuture<'_, Result<(), SummaryError>> {
        async move {
            let replaced = self
                .records
                .write()
                .await
                .insert(summary.session_id.clone(), summary)
                .is_some();
            tracing::debug!(target: "summary::memory", replaced, "summary stored");
            Ok(())
        }
        .boxed()
    }

    fn fetch(
        &self,
        session_id: &SessionId,
    ) -> BoxFuture<'_, Result<Option<SummaryDigest>, SummaryError>> {
        let session_id = session_id.clone();
        async move {
            Ok(self
                .records
                .read()
                .await
                .get(&session_id)
                .map(EmotionSummary::digest))
        }
        .boxed()
    }
}
