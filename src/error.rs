//! Error taxonomy for the analysis pipeline.
//!
//! `ReadError` is local and never retried. `RequestError` and the validation
//! variant of `AnalysisError` are both retried by the client's backoff loop,
//! and whichever one the final attempt produced is handed back unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while turning a user-selected file into an [`UploadedFile`](crate::ingest::UploadedFile).
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("invalid base64 payload: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// Transport-level failure talking to the hosted model.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Failure of a single analysis attempt.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("response did not match the analysis schema: {0}")]
    Validation(String),
}

impl AnalysisError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_become_validation_failures() {
        let err: AnalysisError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.is_validation());
    }

    #[test]
    fn request_errors_display_transparently() {
        let err = AnalysisError::from(RequestError::Status {
            status: 503,
            body: "overloaded".into(),
        });
        assert_eq!(err.to_string(), "model API returned 503: overloaded");
        assert!(!err.is_validation());
    }

    #[test]
    fn too_large_message_names_the_limit() {
        let err = ReadError::TooLarge {
            name: "clip.mp4".into(),
            size: 30,
            limit: 20,
        };
        assert_eq!(
            err.to_string(),
            "clip.mp4 is 30 bytes, larger than the 20 byte limit"
        );
    }
}
