use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{completion::SamplingParams, error::EvalError};

use super::collector::{Collector, ProgressSink};
use super::dispatcher::{CancelPolicy, Dispatcher};
use super::invoker::Invoker;
use super::request::EvaluationRequest;
use super::result::EvaluationResult;
use super::summary::BatchSummary;

/// Lifecycle of a [`BatchJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Created,
    Running,
    Completed,
}

/// Per-run knobs that are not part of the batch definition.
pub struct RunOptions {
    cancel: CancellationToken,
    policy: CancelPolicy,
    progress: Option<ProgressSink>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            policy: CancelPolicy::default(),
            progress: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the batch when `token` fires.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Receives the completed fraction once per finished request.
    pub fn progress<F>(mut self, sink: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.progress = Some(Box::new(sink));
        self
    }
}

/// Outcome of a completed batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Identifier used in log lines
    pub id: Uuid,
    /// One result per request, in request order
    pub results: Vec<EvaluationResult>,
    pub summary: BatchSummary,
}

/// An ordered set of requests evaluated under one concurrency bound.
///
/// A batch runs once: `Created -> Running -> Completed`. It always reaches
/// `Completed`, even when every request fails.
#[derive(Debug)]
pub struct BatchJob {
    id: Uuid,
    requests: Arc<[EvaluationRequest]>,
    concurrency: NonZeroUsize,
    state: BatchState,
}

impl BatchJob {
    /// Creates a batch from requests whose indices are unique and cover
    /// `[0, N)`. Requests are reordered by index.
    pub fn new(
        mut requests: Vec<EvaluationRequest>,
        concurrency: usize,
    ) -> Result<Self, EvalError> {
        let concurrency = NonZeroUsize::new(concurrency).ok_or_else(|| {
            EvalError::InvalidRequest("concurrency limit must be positive".to_string())
        })?;

        let total = requests.len();
        let mut seen = HashSet::with_capacity(total);
        for request in &requests {
            if request.index() >= total {
                return Err(EvalError::InvalidRequest(format!(
                    "request index {} outside batch of {total}",
                    request.index()
                )));
            }
            if !seen.insert(request.index()) {
                return Err(EvalError::InvalidRequest(format!(
                    "duplicate request index {}",
                    request.index()
                )));
            }
        }
        requests.sort_by_key(EvaluationRequest::index);

        Ok(Self {
            id: Uuid::new_v4(),
            requests: requests.into(),
            concurrency,
            state: BatchState::Created,
        })
    }

    /// Creates a batch from rendered prompts, indexed by position, all sharing
    /// one system instruction and sampling configuration.
    pub fn from_prompts<I, S>(
        prompts: I,
        system_instruction: Option<String>,
        sampling: SamplingParams,
        concurrency: usize,
    ) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let system: Option<Arc<str>> = system_instruction.map(Arc::from);
        let requests = prompts
            .into_iter()
            .enumerate()
            .map(|(index, prompt)| {
                EvaluationRequest::new(index, prompt)
                    .with_system_instruction(system.clone())
                    .with_sampling(sampling)
            })
            .collect();
        Self::new(requests, concurrency)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Configured bound; at most `min(concurrency, len)` workers are spawned.
    pub fn concurrency(&self) -> NonZeroUsize {
        self.concurrency
    }

    pub fn requests(&self) -> &[EvaluationRequest] {
        &self.requests
    }

    /// Evaluates every request and returns the results in request order.
    ///
    /// Item failures never fail the batch. An error is returned only if the
    /// batch already ran or a result broke the one-write-per-slot rule.
    pub async fn run(
        &mut self,
        invoker: Arc<Invoker>,
        options: RunOptions,
    ) -> Result<BatchReport, EvalError> {
        if self.state != BatchState::Created {
            return Err(EvalError::Batch(format!(
                "batch {} cannot run again (state {:?})",
                self.id, self.state
            )));
        }
        self.state = BatchState::Running;
        log::info!(
            "batch {} running: {} requests, concurrency {}, model {}",
            self.id,
            self.len(),
            self.concurrency,
            invoker.model()
        );

        let started = Instant::now();
        let mut collector = Collector::new(self.len());
        if let Some(sink) = options.progress {
            collector = collector.with_progress(sink);
        }
        let dispatcher = Dispatcher::new(invoker, self.concurrency)
            .with_cancellation(options.cancel)
            .cancel_policy(options.policy);

        let mut violation: Option<EvalError> = None;
        dispatcher
            .run(Arc::clone(&self.requests), |result| {
                if let Err(err) = collector.record(result) {
                    log::error!("batch {}: {err}", self.id);
                    violation.get_or_insert(err);
                }
            })
            .await;

        self.state = BatchState::Completed;
        if let Some(err) = violation {
            return Err(err);
        }
        let results = collector.finish()?;
        let summary = BatchSummary::from_results(&results, started.elapsed());
        log::info!(
            "batch {} completed in {:.2}s: {} succeeded, {} failed, {} cancelled",
            self.id,
            summary.wall_time.as_secs_f64(),
            summary.succeeded,
            summary.failed,
            summary.cancelled
        );

        Ok(BatchReport {
            id: self.id,
            results,
            summary,
        })
    }
}
