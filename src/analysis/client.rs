use std::sync::Arc;

use super::grounding::extract_grounding_sources;
use super::prompt::build_request;
use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::transport::{AnalysisTransport, GeminiTransport};
use super::types::AnalysisResult;
use super::wire::GenerateResponse;
use crate::config::Config;
use crate::error::{AnalysisError, RequestError};
use crate::ingest::UploadedFile;

/// Owns the contract with the hosted model: request shape, response
/// validation, citations and the retry schedule.
#[derive(Clone)]
pub struct AnalysisClient {
    transport: Arc<dyn AnalysisTransport>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    enable_search: bool,
}

impl AnalysisClient {
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            enable_search: true,
        }
    }

    /// Client backed by [`GeminiTransport`], with retry and search settings from `config`.
    pub fn from_config(config: &Config) -> Result<Self, RequestError> {
        let transport = GeminiTransport::new(&config.api)?;
        Ok(Self::new(Arc::new(transport))
            .with_policy(config.retry_policy())
            .with_search(config.api.enable_search))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_search(mut self, enable_search: bool) -> Self {
        self.enable_search = enable_search;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Analyze one file. The request is built once and reused verbatim for
    /// every attempt; after the last retry the final attempt's error is returned.
    pub async fn analyze(&self, file: &UploadedFile) -> Result<AnalysisResult, AnalysisError> {
        let request = build_request(file, self.enable_search);
        tracing::debug!(
            transport = self.transport.name(),
            file = file.display_name(),
            mime_type = file.mime_type(),
            size = file.size(),
            "analysis request built"
        );

        let request = &request;
        let transport = self.transport.as_ref();
        self.policy
            .run(self.sleeper.as_ref(), move |attempt| async move {
                tracing::debug!(attempt, "analysis attempt");
                let response = transport.generate(request).await?;
                parse_response(&response)
            })
            .await
    }
}

/// Validate the model output against [`AnalysisResult`] and attach citations.
pub fn parse_response(response: &GenerateResponse) -> Result<AnalysisResult, AnalysisError> {
    let text = response
        .text()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AnalysisError::validation("model returned no text"))?;

    let mut result: AnalysisResult = serde_json::from_str(&text)?;
    result.grounding_sources = extract_grounding_sources(response);
    Ok(result)
}
