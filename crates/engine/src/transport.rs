//! The transport seam.
//!
//! Persisting is fire-and-await: `send` hands a request off and returns at
//! once; the outcome comes back later as a `Completion`, either pulled by the
//! controller through `poll` or pushed by the host through
//! `LifecycleController::complete`. Every request completes exactly once.

use celledit_protocol::{EditResponse, PersistRequest};

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error type for persist requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection-level failure
    Network(String),
    /// Non-success HTTP status with body
    Http(u16, String),
    /// Response body could not be parsed
    Parse(String),
    /// No response within the configured timeout
    Timeout(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            TransportError::Parse(msg) => write!(f, "Parse error: {}", msg),
            TransportError::Timeout(msg) => write!(f, "Timeout: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub id: RequestId,
    pub result: Result<EditResponse, TransportError>,
}

impl Completion {
    pub fn ok(id: RequestId, response: EditResponse) -> Self {
        Self {
            id,
            result: Ok(response),
        }
    }

    pub fn failed(id: RequestId, error: TransportError) -> Self {
        Self {
            id,
            result: Err(error),
        }
    }
}

/// Request primitive the commit pipeline persists through.
pub trait Transport {
    /// Start a request. Must not block on the network.
    fn send(&mut self, request: PersistRequest) -> RequestId;

    /// Completions that arrived since the last call. Transports whose host
    /// delivers completions directly can keep the default.
    fn poll(&mut self) -> Vec<Completion> {
        Vec::new()
    }
}
