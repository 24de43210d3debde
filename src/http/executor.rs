use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::method::ProbeMethod;
use super::payload::Payload;
use super::transport::{Transport, TransportFailure, WireRequest};

/// Per-call wall-clock budget when the caller does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error bodies are kept for the detail report but capped so one verbose
/// endpoint cannot bloat it.
const MAX_ERROR_BODY_BYTES: usize = 2048;

/// Classified failure of one probe call. Decided once here; downstream code
/// only reads `status()` and the rendered message, never re-inspects shape.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("request timed out after {budget_ms} ms")]
    Timeout { budget_ms: u64 },
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("failed to decode 2xx response as JSON: {0}")]
    Decode(String),
}

impl ExecutorError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ExecutorError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Sends one authenticated request per call, under a hard timeout. A non-2xx
/// status is an expected probe signal (403/404 carry the permission answer),
/// reported as data rather than treated as a run failure.
pub struct Executor {
    transport: Box<dyn Transport>,
    timeout: Duration,
}

impl Executor {
    pub fn new(transport: Box<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub async fn execute(
        &self,
        method: ProbeMethod,
        url: &str,
        token: &str,
        payload: &Payload,
    ) -> Result<Value, ExecutorError> {
        let request = WireRequest {
            method,
            url: url.to_string(),
            bearer_token: token.to_string(),
            query: payload.query.clone(),
            body: payload.body.clone(),
            timeout: self.timeout,
        };

        // The transport gets the same budget, but the outer timeout is the
        // hard wall clock: expiry cancels the in-flight future.
        let outcome = tokio::time::timeout(self.timeout, self.transport.send(&request)).await;

        let response = match outcome {
            Err(_) => {
                return Err(ExecutorError::Timeout {
                    budget_ms: self.timeout.as_millis() as u64,
                })
            }
            Ok(Err(TransportFailure::TimedOut)) => {
                return Err(ExecutorError::Timeout {
                    budget_ms: self.timeout.as_millis() as u64,
                })
            }
            Ok(Err(TransportFailure::Failed(message))) => {
                return Err(ExecutorError::Transport(message))
            }
            Ok(Ok(response)) => response,
        };

        if !(200..300).contains(&response.status) {
            tracing::debug!(status = response.status, url, "non-2xx probe response");
            return Err(ExecutorError::HttpStatus {
                status: response.status,
                body: cap_body(&response.body),
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|err| ExecutorError::Decode(err.to_string()))
    }
}

fn cap_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}
