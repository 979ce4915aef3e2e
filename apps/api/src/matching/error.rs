use std::time::Duration;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Why a call to the external analysis collaborator never produced a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("cancelled by caller")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("collaborator returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Errors surfaced by the scoring core.
///
/// The deterministic strategy only ever produces `InvalidInput`. The external
/// strategy keeps transport and schema failures apart so callers can choose
/// their own fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed collaborator response: {reason}")]
    MalformedResponse { raw: String, reason: String },

    #[error("transport failure: {0}")]
    Transport(#[from] TransportFailure),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MatchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MatchError::InvalidInput(message.into())
    }

    pub fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::MalformedResponse {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// True for failures where repeating the same read-only call may succeed:
    /// timeouts, connection errors, 429 and 5xx. Other statuses are the
    /// request's fault and fail again.
    pub fn is_retryable(&self) -> bool {
        match self {
            MatchError::Transport(TransportFailure::Timeout(_) | TransportFailure::Http(_)) => true,
            MatchError::Transport(TransportFailure::Api { status, .. }) => {
                *status == 429 || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

impl From<LlmError> for MatchError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => MatchError::Transport(TransportFailure::Http(e.to_string())),
            LlmError::Api { status, message } => {
                MatchError::Transport(TransportFailure::Api { status, message })
            }
            LlmError::RateLimited { retries } => MatchError::Transport(TransportFailure::Api {
                status: 429,
                message: format!("rate limited after {retries} attempts"),
            }),
            LlmError::Envelope { body, source } => MatchError::malformed(body, source.to_string()),
            LlmError::EmptyContent => MatchError::malformed("", "collaborator returned no content"),
        }
    }
}
