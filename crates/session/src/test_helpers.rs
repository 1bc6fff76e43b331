//! Shared test doubles for session tests.

use docchat_core::document::SourceKind;
use docchat_core::error::{ExtractionError, GatewayError};
use docchat_core::extract::DocumentExtractor;
use docchat_core::gateway::{AssembledRequest, Completion, CompletionGateway};
use std::sync::Mutex;

/// A gateway that returns scripted outcomes in sequence and records every
/// request it receives.
///
/// Panics if more calls are made than outcomes provided.
pub struct SequentialMockGateway {
    outcomes: Mutex<Vec<Result<Completion, GatewayError>>>,
    requests: Mutex<Vec<AssembledRequest>>,
}

impl SequentialMockGateway {
    pub fn new(outcomes: Vec<Result<Completion, GatewayError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(Completion::text(*t))).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<AssembledRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionGateway for SequentialMockGateway {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: &AssembledRequest) -> Result<Completion, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        let outcomes = self.outcomes.lock().unwrap();
        let call = requests.len();
        if call >= outcomes.len() {
            panic!(
                "SequentialMockGateway: no more outcomes (call #{}, have {})",
                call,
                outcomes.len()
            );
        }
        requests.push(request.clone());
        outcomes[call].clone()
    }
}

/// A gateway that always fails with a network error.
pub struct FailingGateway;

#[async_trait::async_trait]
impl CompletionGateway for FailingGateway {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &AssembledRequest) -> Result<Completion, GatewayError> {
        Err(GatewayError::Network("connection refused".into()))
    }
}

/// Treats uploaded bytes as UTF-8 regardless of kind; bytes starting with
/// `BAD` fail extraction.
pub struct Utf8Extractor;

#[async_trait::async_trait]
impl DocumentExtractor for Utf8Extractor {
    async fn extract(&self, bytes: &[u8], _kind: SourceKind) -> Result<String, ExtractionError> {
        if bytes.starts_with(b"BAD") {
            return Err(ExtractionError::Pdf("corrupt document".into()));
        }
        String::from_utf8(bytes.to_vec()).map_err(|e| ExtractionError::InvalidUtf8(e.to_string()))
    }
}
