//! Worker loop: claim -> invoke -> report -> repeat.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::dispatcher::CancelPolicy;
use super::invoker::Invoker;
use super::request::EvaluationRequest;
use super::result::EvaluationResult;

/// Pending requests, handed out FIFO. Each position is claimed exactly once.
pub(super) struct WorkQueue {
    requests: Arc<[EvaluationRequest]>,
    cursor: AtomicUsize,
}

impl WorkQueue {
    pub(super) fn new(requests: Arc<[EvaluationRequest]>) -> Self {
        Self {
            requests,
            cursor: AtomicUsize::new(0),
        }
    }

    fn claim(&self) -> Option<&EvaluationRequest> {
        let position = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.requests.get(position)
    }
}

/// A worker holds at most one in-flight request. Workers share the queue and
/// the invoker, and report through a channel to the dispatcher's aggregator.
pub(super) struct Worker {
    pub(super) id: usize,
    pub(super) queue: Arc<WorkQueue>,
    pub(super) invoker: Arc<Invoker>,
    pub(super) results: mpsc::Sender<EvaluationResult>,
    pub(super) cancel: CancellationToken,
    pub(super) policy: CancelPolicy,
}

impl Worker {
    pub(super) async fn run(self) {
        let mut processed = 0usize;
        let mut failed = 0usize;
        log::debug!("worker {} started", self.id);

        while let Some(request) = self.queue.claim() {
            let result = self.process(request).await;
            processed += 1;
            if !result.succeeded() {
                failed += 1;
            }
            if self.results.send(result).await.is_err() {
                log::debug!("worker {}: result channel closed, stopping", self.id);
                break;
            }
        }

        log::debug!(
            "worker {} finished: processed={processed} unsuccessful={failed}",
            self.id
        );
    }

    async fn process(&self, request: &EvaluationRequest) -> EvaluationResult {
        if self.cancel.is_cancelled() {
            return EvaluationResult::cancelled(request.index(), Duration::ZERO);
        }
        match self.policy {
            CancelPolicy::FinishInFlight => self.invoker.invoke_request(request).await,
            CancelPolicy::Abandon => {
                let started = Instant::now();
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        log::debug!(
                            "worker {} abandoned request {}",
                            self.id,
                            request.index()
                        );
                        EvaluationResult::cancelled(request.index(), started.elapsed())
                    }
                    result = self.invoker.invoke_request(request) => result,
                }
            }
        }
    }
}
