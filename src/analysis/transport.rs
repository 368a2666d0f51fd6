use std::time::Duration;

use async_trait::async_trait;

use super::wire::{GenerateRequest, GenerateResponse};
use crate::config::ApiConfig;
use crate::error::{AnalysisError, RequestError};

/// One request/response exchange with the hosted model.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AnalysisError>;
}

/// `generateContent` over HTTPS with reqwest.
pub struct GeminiTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiTransport {
    /// The credential comes from `config`; an empty or missing key is rejected here
    /// rather than on the first request.
    pub fn new(config: &ApiConfig) -> Result<Self, RequestError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RequestError::MissingCredential)?
            .to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: Self::endpoint_for(&config.base_url, &config.model),
            api_key,
        })
    }

    pub fn endpoint_for(base_url: &str, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisTransport for GeminiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AnalysisError> {
        tracing::debug!(endpoint = %self.endpoint, "sending generateContent request");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(RequestError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RequestError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response.text().await.map_err(RequestError::from)?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_key_is_rejected() {
        let mut config = ApiConfig::default();
        assert!(matches!(
            GeminiTransport::new(&config),
            Err(RequestError::MissingCredential)
        ));
        config.api_key = Some("   ".into());
        assert!(matches!(
            GeminiTransport::new(&config),
            Err(RequestError::MissingCredential)
        ));
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        assert_eq!(
            GeminiTransport::endpoint_for("https://api.example/", "gemini-x"),
            "https://api.example/v1beta/models/gemini-x:generateContent"
        );

        let config = ApiConfig {
            api_key: Some("k".into()),
            timeout_secs: Some(30),
            ..ApiConfig::default()
        };
        let transport = GeminiTransport::new(&config).unwrap();
        assert!(transport.endpoint().ends_with(":generateContent"));
        assert_eq!(transport.name(), "gemini");
    }
}
