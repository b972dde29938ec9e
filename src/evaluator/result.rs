use std::time::Duration;

use crate::error::FailureKind;

/// Prefix of the plain-text form of a failed evaluation.
pub const ERROR_MARKER: &str = "[ERROR]";
/// Prefix of the plain-text form of an evaluation that never ran to completion.
pub const CANCELLED_MARKER: &str = "[CANCELLED]";

/// What happened to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The endpoint returned this text.
    Completed(String),
    /// The call failed; the batch carries on.
    Failed {
        kind: FailureKind,
        description: String,
    },
    /// The batch was cancelled before this request produced a response.
    Cancelled,
}

/// Result for the request with the same `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    index: usize,
    outcome: Outcome,
    elapsed: Duration,
}

impl EvaluationResult {
    pub fn new(index: usize, outcome: Outcome, elapsed: Duration) -> Self {
        Self {
            index,
            outcome,
            elapsed,
        }
    }

    pub(crate) fn cancelled(index: usize, elapsed: Duration) -> Self {
        Self::new(index, Outcome::Cancelled, elapsed)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Wall-clock time of the remote call, excluding time spent queued.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Completed(_))
    }

    /// Short status label: `completed`, `failed` or `cancelled`.
    pub fn status(&self) -> &'static str {
        match self.outcome {
            Outcome::Completed(_) => "completed",
            Outcome::Failed { .. } => "failed",
            Outcome::Cancelled => "cancelled",
        }
    }

    /// Plain-text form used by spreadsheet-style exports: the response
    /// verbatim, or a marker-prefixed description.
    pub fn text(&self) -> String {
        match &self.outcome {
            Outcome::Completed(text) => text.clone(),
            Outcome::Failed { description, .. } => format!("{ERROR_MARKER} {description}"),
            Outcome::Cancelled => format!("{CANCELLED_MARKER} batch cancelled before completion"),
        }
    }
}
