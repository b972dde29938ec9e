//! Recording completion providers shared by the evaluator tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::{
    chat::ChatMessage,
    completion::{CompletionProvider, SamplingParams},
    error::EvalError,
};

type RespondFn = dyn Fn(&str) -> Result<String, EvalError> + Send + Sync;
type DelayFn = dyn Fn(&str) -> Duration + Send + Sync;

/// Provider whose answer and latency are pure functions of the user prompt.
///
/// Records every call so tests can check concurrency and overlap.
pub struct ScriptedProvider {
    respond: Box<RespondFn>,
    delay: Box<DelayFn>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    windows: Mutex<Vec<(Instant, Instant)>>,
    finished: Mutex<Vec<String>>,
    messages: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<String, EvalError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            delay: Box::new(|_| Duration::ZERO),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            windows: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Reverses the prompt.
    pub fn reversing() -> Self {
        Self::new(|prompt| Ok(prompt.chars().rev().collect()))
    }

    pub fn with_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(&str) -> Duration + Send + Sync + 'static,
    {
        self.delay = Box::new(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Start/end instants of every finished call, in finishing order.
    pub fn windows(&self) -> Vec<(Instant, Instant)> {
        self.windows.lock().expect("windows lock").clone()
    }

    /// User prompts in the order their calls finished.
    pub fn finish_order(&self) -> Vec<String> {
        self.finished.lock().expect("finished lock").clone()
    }

    pub fn seen_messages(&self) -> Vec<Vec<ChatMessage>> {
        self.messages.lock().expect("messages lock").clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _sampling: &SamplingParams,
    ) -> Result<String, EvalError> {
        let started = Instant::now();
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.messages
            .lock()
            .expect("messages lock")
            .push(messages.to_vec());

        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let delay = (self.delay)(&prompt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.windows
            .lock()
            .expect("windows lock")
            .push((started, Instant::now()));
        self.finished
            .lock()
            .expect("finished lock")
            .push(prompt.clone());
        (self.respond)(&prompt)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
