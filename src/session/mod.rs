//! Analysis session
//!
//! The state machine a renderer drives: stage a file, run one analysis at a
//! time, show progress captions while it runs, then show the verdict or a
//! generic error until the user resets or picks another file.
//!
//! Every transition bumps a generation counter. An in-flight analysis keeps
//! the generation it started under and its outcome is dropped if the session
//! has moved on (reset, or a new file) by the time it settles.

pub mod progress;

pub use progress::{next_index, spawn_ticker, PROGRESS_CAPTIONS, PROGRESS_TICK};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::analysis::{AnalysisClient, AnalysisResult};
use crate::error::ReadError;
use crate::ingest::{FileIngestor, UploadedFile};
use crate::share;

/// Shown to the user for every failed analysis, whatever the cause.
pub const GENERIC_ERROR_MESSAGE: &str =
    "The analysis could not be completed. Please check your connection or try a different file.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Idle,
    HasFile,
    Analyzing,
    Succeeded,
    Failed,
}

/// What happened to a `start_analysis` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The call settled and the session now shows `Succeeded` or `Failed`.
    Settled(SessionStatus),
    /// Nothing to do: no staged file, or an analysis is already running.
    Ignored,
    /// The session was reset or given a new file while the call was in flight.
    Superseded,
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub current_file: Option<Arc<UploadedFile>>,
    pub result: Option<AnalysisResult>,
    pub error_message: Option<String>,
    pub progress_index: usize,
    pub caption: &'static str,
}

#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    current_file: Option<Arc<UploadedFile>>,
    result: Option<AnalysisResult>,
    error_message: Option<String>,
    progress_index: usize,
    generation: u64,
    ticker: Option<CancellationToken>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            current_file: None,
            result: None,
            error_message: None,
            progress_index: 0,
            generation: 0,
            ticker: None,
        }
    }

    /// Start a new generation: stop any ticker and orphan any in-flight call.
    fn advance_generation(&mut self) -> u64 {
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
        self.generation += 1;
        self.generation
    }
}

pub struct AnalysisSession {
    id: Uuid,
    client: AnalysisClient,
    ingestor: FileIngestor,
    tick: Duration,
    state: Arc<Mutex<SessionState>>,
    progress_tx: Arc<watch::Sender<usize>>,
}

impl AnalysisSession {
    pub fn new(client: AnalysisClient, ingestor: FileIngestor) -> Self {
        let (progress_tx, _) = watch::channel(0);
        Self {
            id: Uuid::new_v4(),
            client,
            ingestor,
            tick: PROGRESS_TICK,
            state: Arc::new(Mutex::new(SessionState::new())),
            progress_tx: Arc::new(progress_tx),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            status: state.status,
            current_file: state.current_file.clone(),
            result: state.result.clone(),
            error_message: state.error_message.clone(),
            progress_index: state.progress_index,
            caption: caption_for(state.progress_index),
        }
    }

    /// Progress index updates, one per tick while analyzing.
    pub fn subscribe_progress(&self) -> watch::Receiver<usize> {
        self.progress_tx.subscribe()
    }

    /// Read and stage a file from disk. On error the session is left as it was.
    pub async fn select_file(&self, path: &Path) -> Result<(), ReadError> {
        let file = self.ingestor.ingest(path).await?;
        self.select_uploaded(file);
        Ok(())
    }

    /// Stage an already-ingested file, replacing whatever was there.
    pub fn select_uploaded(&self, file: UploadedFile) {
        let mut state = self.state.lock();
        let generation = state.advance_generation();
        tracing::info!(
            session = %self.id,
            generation,
            file = file.display_name(),
            mime_type = file.mime_type(),
            "file staged"
        );
        state.status = SessionStatus::HasFile;
        state.current_file = Some(Arc::new(file));
        state.result = None;
        state.error_message = None;
        state.progress_index = 0;
    }

    /// Run the analysis for the staged file and wait for it to settle.
    ///
    /// A no-op while another analysis is running or when no file is staged.
    /// The progress ticker is always stopped before the outcome is recorded.
    pub async fn start_analysis(&self) -> StartOutcome {
        let (generation, file, token) = {
            let mut state = self.state.lock();
            if matches!(state.status, SessionStatus::Idle | SessionStatus::Analyzing) {
                return StartOutcome::Ignored;
            }
            let Some(file) = state.current_file.clone() else {
                return StartOutcome::Ignored;
            };
            let generation = state.advance_generation();
            let token = CancellationToken::new();
            state.ticker = Some(token.clone());
            state.status = SessionStatus::Analyzing;
            state.result = None;
            state.error_message = None;
            state.progress_index = 0;
            (generation, file, token)
        };
        self.progress_tx.send_replace(0);
        tracing::info!(session = %self.id, generation, "analysis started");

        let _in_flight = InFlight {
            session: self.id,
            state: Arc::clone(&self.state),
            progress_tx: Arc::clone(&self.progress_tx),
            generation,
            token: token.clone(),
        };
        let ticker = spawn_ticker(self.tick, token.clone(), {
            let state = Arc::clone(&self.state);
            let progress_tx = Arc::clone(&self.progress_tx);
            move || {
                let mut state = state.lock();
                if state.generation != generation || state.status != SessionStatus::Analyzing {
                    return false;
                }
                state.progress_index = next_index(state.progress_index, PROGRESS_CAPTIONS.len());
                progress_tx.send_replace(state.progress_index);
                true
            }
        });

        let outcome = self.client.analyze(&file).await;

        token.cancel();
        if let Err(err) = ticker.await {
            tracing::warn!(session = %self.id, error = %err, "progress ticker ended abnormally");
        }

        let mut state = self.state.lock();
        if state.generation != generation || state.status != SessionStatus::Analyzing {
            tracing::info!(
                session = %self.id,
                generation,
                current = state.generation,
                "discarding outcome of superseded analysis"
            );
            return StartOutcome::Superseded;
        }
        state.ticker = None;
        match outcome {
            Ok(result) => {
                tracing::info!(
                    session = %self.id,
                    verdict = %result.verdict.safety_rating,
                    sources = result.grounding_sources.as_ref().map_or(0, Vec::len),
                    "analysis succeeded"
                );
                state.result = Some(result);
                state.status = SessionStatus::Succeeded;
            }
            Err(err) => {
                tracing::warn!(session = %self.id, error = %err, "analysis failed");
                state.error_message = Some(GENERIC_ERROR_MESSAGE.to_string());
                state.status = SessionStatus::Failed;
            }
        }
        StartOutcome::Settled(state.status)
    }

    /// Back to `Idle` from any state. An in-flight analysis is orphaned.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let generation = state.advance_generation();
        state.status = SessionStatus::Idle;
        state.current_file = None;
        state.result = None;
        state.error_message = None;
        state.progress_index = 0;
        tracing::info!(session = %self.id, generation, "session reset");
    }

    /// Shareable text for the current result, if there is one.
    pub fn share_text(&self) -> Option<String> {
        self.state.lock().result.as_ref().map(share::share_text)
    }
}

/// Held by `start_analysis` while its call is in flight. If the future is
/// dropped before settling, the ticker stops and the session goes back to
/// `HasFile` so the staged file can be analyzed again.
struct InFlight {
    session: Uuid,
    state: Arc<Mutex<SessionState>>,
    progress_tx: Arc<watch::Sender<usize>>,
    generation: u64,
    token: CancellationToken,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.token.cancel();
        let mut state = self.state.lock();
        if state.generation != self.generation || state.status != SessionStatus::Analyzing {
            return;
        }
        state.ticker = None;
        state.status = SessionStatus::HasFile;
        state.progress_index = 0;
        self.progress_tx.send_replace(0);
        tracing::info!(
            session = %self.session,
            generation = self.generation,
            "analysis cancelled before settling"
        );
    }
}

fn caption_for(index: usize) -> &'static str {
    PROGRESS_CAPTIONS
        .get(index % PROGRESS_CAPTIONS.len())
        .copied()
        .unwrap_or_default()
}
