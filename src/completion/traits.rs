use async_trait::async_trait;

use crate::{chat::ChatMessage, error::EvalError};

use super::sampling::SamplingParams;

/// A remote text-completion endpoint bound to one model.
///
/// Implementations perform a single call per invocation. Retry, timing and
/// failure containment are layered on top by
/// [`ResilientProvider`](crate::resilient_llm::ResilientProvider) and
/// [`Invoker`](crate::evaluator::Invoker).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends the instruction set and returns the generated text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        sampling: &SamplingParams,
    ) -> Result<String, EvalError>;

    /// Model identifier used in log lines.
    fn model(&self) -> &str {
        "unknown"
    }
}
