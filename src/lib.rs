//! Remedy Check
//!
//! Send a photo or video of a home remedy to a hosted multimodal model and get
//! back a structured, citation-backed safety verdict.
//!
//! - [`ingest`] reads the user's file into an inline payload.
//! - [`analysis`] talks to the model, validates the answer and retries on failure.
//! - [`session`] is the state machine a front end drives.

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod session;
pub mod share;

pub use analysis::{AnalysisClient, AnalysisResult, SafetyRating};
pub use config::Config;
pub use error::{AnalysisError, ReadError, RequestError};
pub use ingest::{FileIngestor, UploadedFile};
pub use session::{AnalysisSession, SessionSnapshot, SessionStatus, StartOutcome};
