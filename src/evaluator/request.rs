use std::sync::Arc;

use crate::completion::SamplingParams;

/// One rendered prompt of a batch. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    index: usize,
    prompt: String,
    system_instruction: Option<Arc<str>>,
    sampling: SamplingParams,
}

impl EvaluationRequest {
    /// Creates a request at `index` with default sampling and no system instruction.
    pub fn new(index: usize, prompt: impl Into<String>) -> Self {
        Self {
            index,
            prompt: prompt.into(),
            system_instruction: None,
            sampling: SamplingParams::default(),
        }
    }

    /// Sets the system instruction; batches share one allocation across requests.
    pub fn with_system_instruction(mut self, system: Option<Arc<str>>) -> Self {
        self.system_instruction = system;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Position of the request in the original ordered sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    pub fn sampling(&self) -> &SamplingParams {
        &self.sampling
    }
}
