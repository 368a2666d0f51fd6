#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use remedy_check::analysis::{
    AnalysisTransport, GenerateRequest, GenerateResponse, RetryPolicy, Sleeper,
};
use remedy_check::error::{AnalysisError, RequestError};
use remedy_check::{AnalysisClient, AnalysisSession, FileIngestor};

/// What the scripted transport does on one call.
pub enum Step {
    Fail,
    Garbage,
    Reply(Value),
}

/// Plays back a fixed script and records every serialized request.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    pub requests: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl AnalysisTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AnalysisError> {
        self.requests
            .lock()
            .push(serde_json::to_vec(request).expect("request serializes"));
        let step = self.steps.lock().pop_front().unwrap_or(Step::Fail);
        match step {
            Step::Fail => Err(RequestError::Status {
                status: 503,
                body: "unavailable".into(),
            }
            .into()),
            Step::Garbage => Ok(model_reply_text("this is not json")),
            Step::Reply(value) => Ok(serde_json::from_value(value).expect("valid response fixture")),
        }
    }
}

/// Records waits instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().push(duration);
    }
}

pub fn analysis_json() -> Value {
    json!({
        "ingredients": {"identified": ["bitter gourd", "amla"], "visualEvidence": "green juice in a glass"},
        "claim": "Reverses diabetes in 30 days",
        "realityCheck": {
            "traditionalPerspective": "Classical texts describe it for prameha",
            "modernScientificView": "Small trials show a modest glucose effect",
            "theGap": "No evidence of reversal; stopping medication is dangerous"
        },
        "verdict": {"safetyRating": "DANGEROUS", "riskLevel": "Hypoglycemia with insulin"},
        "multilingualSummary": {
            "english": "It will not reverse diabetes. Do not stop your medicine.",
            "local": "यह मधुमेह ठीक नहीं करता। दवा बंद न करें।"
        }
    })
}

pub fn model_reply_text(text: &str) -> GenerateResponse {
    serde_json::from_value(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}))
        .expect("valid response fixture")
}

pub fn success_reply(chunks: Option<Value>) -> Value {
    let mut candidate = json!({
        "content": {"role": "model", "parts": [{"text": analysis_json().to_string()}]},
        "finishReason": "STOP"
    });
    if let Some(chunks) = chunks {
        candidate["groundingMetadata"] = json!({ "groundingChunks": chunks });
    }
    json!({ "candidates": [candidate] })
}

pub fn client(transport: Arc<ScriptedTransport>, sleeper: Arc<RecordingSleeper>) -> AnalysisClient {
    AnalysisClient::new(transport)
        .with_policy(RetryPolicy::default())
        .with_sleeper(sleeper)
}

pub fn session(transport: Arc<ScriptedTransport>, sleeper: Arc<RecordingSleeper>) -> AnalysisSession {
    AnalysisSession::new(client(transport, sleeper), FileIngestor::default())
}
