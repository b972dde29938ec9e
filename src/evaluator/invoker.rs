use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;

use crate::{
    chat::ChatMessage,
    completion::{CompletionProvider, SamplingParams},
    error::FailureKind,
};

use super::request::EvaluationRequest;
use super::result::{EvaluationResult, Outcome};

/// Performs exactly one call against the completion endpoint and turns any
/// failure, including a panic in the provider, into a [`Outcome::Failed`].
pub struct Invoker {
    provider: Arc<dyn CompletionProvider>,
}

impl Invoker {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Model identifier of the underlying provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Sends `prompt` (preceded by the optional system instruction) and
    /// returns the outcome with the time spent in the call.
    pub async fn invoke(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        sampling: &SamplingParams,
    ) -> (Outcome, Duration) {
        let messages = ChatMessage::instructions(system_instruction, prompt);
        let start = Instant::now();
        let call = AssertUnwindSafe(self.provider.complete(&messages, sampling))
            .catch_unwind()
            .await;
        let elapsed = start.elapsed();

        let outcome = match call {
            Ok(Ok(text)) => Outcome::Completed(text),
            Ok(Err(err)) => Outcome::Failed {
                kind: err.kind(),
                description: err.to_string(),
            },
            Err(panic) => Outcome::Failed {
                kind: FailureKind::Internal,
                description: format!("provider panicked: {}", panic_message(panic.as_ref())),
            },
        };
        (outcome, elapsed)
    }

    /// Runs one request and tags the outcome with its index.
    pub async fn invoke_request(&self, request: &EvaluationRequest) -> EvaluationResult {
        let (outcome, elapsed) = self
            .invoke(
                request.prompt(),
                request.system_instruction(),
                request.sampling(),
            )
            .await;
        if let Outcome::Failed { kind, description } = &outcome {
            log::warn!(
                "request {} failed ({kind}) after {:.3}s: {description}",
                request.index(),
                elapsed.as_secs_f64()
            );
        }
        EvaluationResult::new(request.index(), outcome, elapsed)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
