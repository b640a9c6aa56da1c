use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::types::{
    AnalysisRequest, AnalysisResponse, ErrorBody, FeedbackRequest, FeedbackResponse,
};
use crate::error::{ClientError, Result, FEEDBACK_FAILURE, GENERIC_REQUEST_FAILURE};

/// The two endpoints the controller talks to.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn suggest(&self, request: &AnalysisRequest) -> Result<AnalysisResponse>;
    async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResponse>;
}

#[derive(Clone)]
pub struct SuggestClient {
    client: Client,
    base_url: String,
}

impl SuggestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` as JSON and decode a 2xx reply. On any other status the
    /// error body is handed to `error_message`.
    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        error_message: fn(&str) -> String,
    ) -> Result<T>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "sending request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "request failed before a response arrived");
                ClientError::Request(e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%url, %status, "backend returned an error status");
            return Err(ClientError::Request(error_message(&text)));
        }

        tracing::debug!(%url, %status, "request succeeded");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Backend for SuggestClient {
    async fn suggest(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        self.post_json("/suggest", request, parse_error_detail).await
    }

    async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResponse> {
        self.post_json("/feedback", request, |_| FEEDBACK_FAILURE.to_string())
            .await
    }
}

/// Pull the `detail` message out of an error body, falling back to a generic
/// message when the body is not JSON or has no usable detail.
pub fn parse_error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);

    match detail {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => {
            GENERIC_REQUEST_FAILURE.to_string()
        }
        // Validation errors carry a list of objects
        Some(other) => other.to_string(),
    }
}
