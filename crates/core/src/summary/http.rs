use crate::config::{SessionId, SummaryEndpoint};
use crate::emotion::Emotion;
use crate::summary::{EmotionSummary, SummaryDigest, SummaryError, SummaryStore};
use crate::util::{retry_with_backoff, RetryConfig};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;

const LOG_TARGET: &str = "summary::http";

#[derive(Clone)]
pub struct HttpSummaryStore {
    client: Client,
    endpoint: SummaryEndpoint,
    retry: RetryConfig,
}

impl HttpSummaryStore {
    pub fn new(endpoint: SummaryEndpoint) -> Self {
        Self::with_retry(endpoint, RetryConfig::default())
    }

    pub fn with_retry(endpoint: SummaryEndpoint, retry: RetryConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            retry,
        }
    }

    async fn post_once(&self, summary: &EmotionSummary) -> Result<(), SummaryError> {
        let url = self
            .endpoint
            .summary_url()
            .map_err(|e| SummaryError::Transport(e.to_string()))?;
        let response = self
            .client
            .post(url)
            .json(summary)
            .send()
            .await
            .map_err(|e| SummaryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let ack: Ack = response
            .json()
            .await
            .map_err(|e| SummaryError::Decode(e.to_string()))?;
        if ack.status == "safe_mode" {
            return Err(SummaryError::SafeMode);
        }
        Ok(())
    }

    async fn get_once(&self, session_id: &SessionId) -> Result<Option<SummaryDigest>, SummaryError> {
        let url = self
            .endpoint
            .dashboard_url(session_id)
            .map_err(|e| SummaryError::Transport(e.to_string()))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SummaryError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let dashboard: DashboardResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::Decode(e.to_string()))?;
        Ok(Some(dashboard.into_digest()))
    }
}

#[derive(Deserialize)]
struct Ack {
    status: String,
}

#[derive(Deserialize)]
struct DashboardResponse {
    data: DashboardData,
}

#[derive(Deserialize)]
struct DashboardData {
    session_id: SessionId,
    emotion_summary: DashboardSummary,
}

#[derive(Deserialize)]
struct DashboardSummary {
    total_emotions: usize,
    emotion_distribution: BTreeMap<String, usize>,
    average_empathy: f64,
}

impl DashboardResponse {
    fn into_digest(self) -> SummaryDigest {
        let summary = self.data.emotion_summary;
        let mut emotion_distribution: BTreeMap<Emotion, usize> = BTreeMap::new();
        for (label, count) in summary.emotion_distribution {
            *emotion_distribution.entry(Emotion::normalize(&label)).or_insert(0) += count;
        }
        SummaryDigest {
            session_id: self.data.session_id,
            total_emotions: summary.total_emotions,
            emotion_distribution,
            average_empathy: summary.average_empathy,
        }
    }
}

impl SummaryStore for HttpSummaryStore {
    fn upsert(&self, summary: EmotionSummary) -> BoxFuture<'_, Result<(), SummaryError>> {
        async move {
            let result = retry_with_backoff(
                &self.retry,
                "summary upsert",
                || self.post_once(&summary),
                SummaryError::is_retryable,
            )
            .await;
            match &result {
                Ok(()) => tracing::info!(
                    target: LOG_TARGET,
                    session_id = %summary.session_id,
                    samples = summary.emotion_timeline.emotions.len(),
                    "summary submitted"
                ),
                Err(e) => tracing::warn!(target: LOG_TARGET, session_id = %summary.session_id, error = %e, "summary submission failed"),
            }
            result
        }
        .boxed()
    }

    fn fetch(
        &self,
        session_id: &SessionId,
    ) -> BoxFuture<'_, Result<Option<SummaryDigest>, SummaryError>> {
        let session_id = session_id.clone();
        async move {
            retry_with_backoff(
                &self.retry,
                "summary fetch",
                || self.get_once(&session_id),
                SummaryError::is_retryable,
            )
            .await
        }
        .boxed()
    }
}
