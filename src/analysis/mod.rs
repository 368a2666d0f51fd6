//! Analysis request pipeline
//!
//! Builds the model request for an uploaded file, sends it through an
//! [`AnalysisTransport`], validates the structured answer and attaches web
//! citations. Failures are retried on a fixed exponential schedule.

pub mod client;
pub mod grounding;
pub mod prompt;
pub mod retry;
pub mod transport;
pub mod types;
pub mod wire;

pub use client::{parse_response, AnalysisClient};
pub use grounding::{extract_grounding_sources, DEFAULT_SOURCE_TITLE};
pub use prompt::build_request;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{AnalysisTransport, GeminiTransport};
pub use types::{
    AnalysisResult, GroundingSource, Ingredients, MultilingualSummary, RealityCheck,
    SafetyRating, Verdict,
};
pub use wire::{GenerateRequest, GenerateResponse};
