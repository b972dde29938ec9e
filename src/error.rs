use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Error types that can occur while evaluating prompts against a completion endpoint.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Connection, DNS, timeout or request-building failures
    #[error("Transport error: {0}")]
    Transport(String),
    /// The endpoint answered but signaled failure
    #[error("Service error: {0}")]
    Service(String),
    /// The endpoint answered with a non-success HTTP status
    #[error("Service error: HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// API response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormat {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    Json(String),
    /// Invalid request parameters or batch definition
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// A batch was driven outside its lifecycle or broke a slot invariant
    #[error("Batch error: {0}")]
    Batch(String),
    /// Retry attempts exceeded
    #[error("Retry attempts exceeded after {attempts} tries: {last_error}")]
    RetryExceeded { attempts: usize, last_error: String },
}

/// Coarse classification of a failed evaluation, kept on every failed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The remote endpoint could not be reached in time.
    Transport,
    /// The remote endpoint responded with an error or an unusable payload.
    Service,
    /// The failure happened on our side of the call.
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Transport => "transport",
            FailureKind::Service => "service",
            FailureKind::Internal => "internal",
        };
        write!(f, "{name}")
    }
}

impl EvalError {
    /// Classifies the error into the transport/service taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            EvalError::Transport(_) => FailureKind::Transport,
            EvalError::Service(_)
            | EvalError::Status { .. }
            | EvalError::ResponseFormat { .. }
            | EvalError::Json(_) => FailureKind::Service,
            EvalError::RetryExceeded { .. } => FailureKind::Service,
            EvalError::InvalidRequest(_) | EvalError::Batch(_) => FailureKind::Internal,
        }
    }
}

/// Converts reqwest errors, splitting them by where the call broke down.
///
/// Timeouts and connection failures are transport errors even when they
/// surface while the body is being read.
impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        let description = describe_chain(&err);
        if err.is_timeout() || err.is_connect() {
            EvalError::Transport(description)
        } else if err.is_status() || err.is_decode() || err.is_body() {
            EvalError::Service(description)
        } else {
            EvalError::Transport(description)
        }
    }
}

/// Renders an error followed by each of its sources.
fn describe_chain(err: &dyn StdError) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }
    description
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Json(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}
