use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::invoker::Invoker;
use super::request::EvaluationRequest;
use super::result::EvaluationResult;
use super::worker::{WorkQueue, Worker};

/// What happens to calls already in flight when the batch is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Let running calls finish and keep their responses.
    #[default]
    FinishInFlight,
    /// Drop running calls and report them as cancelled.
    Abandon,
}

/// Bounded worker pool running [`Invoker`] calls.
///
/// At most `concurrency` calls are in flight at any instant. Requests are
/// claimed in slice order; results arrive in completion order.
pub struct Dispatcher {
    invoker: Arc<Invoker>,
    concurrency: NonZeroUsize,
    cancel: CancellationToken,
    policy: CancelPolicy,
}

impl Dispatcher {
    pub fn new(invoker: Arc<Invoker>, concurrency: NonZeroUsize) -> Self {
        Self {
            invoker,
            concurrency,
            cancel: CancellationToken::new(),
            policy: CancelPolicy::default(),
        }
    }

    /// Stops the pool from starting new calls once `token` is cancelled.
    /// Requests not yet started are reported as cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs every request exactly once and calls `on_complete` once per
    /// request, in completion order.
    ///
    /// `on_complete` runs on the caller's task, never concurrently with
    /// itself. Returns after the last result has been delivered.
    pub async fn run<F>(&self, requests: Arc<[EvaluationRequest]>, mut on_complete: F)
    where
        F: FnMut(EvaluationResult),
    {
        let total = requests.len();
        if total == 0 {
            log::debug!("dispatcher: empty batch, nothing to run");
            return;
        }

        let worker_count = self.concurrency.get().min(total);
        log::debug!("dispatcher: {total} requests on {worker_count} workers");

        let (tx, mut rx) = mpsc::channel(worker_count);
        let queue = Arc::new(WorkQueue::new(requests));
        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            let worker = Worker {
                id,
                queue: Arc::clone(&queue),
                invoker: Arc::clone(&self.invoker),
                results: tx.clone(),
                cancel: self.cancel.clone(),
                policy: self.policy,
            };
            workers.spawn(worker.run());
        }
        drop(tx);

        while let Some(result) = rx.recv().await {
            on_complete(result);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                log::error!("dispatcher: worker task failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::evaluator::mock::ScriptedProvider;

    fn requests(n: usize) -> Arc<[EvaluationRequest]> {
        (0..n)
            .map(|i| EvaluationRequest::new(i, format!("prompt-{i}")))
            .collect()
    }

    fn dispatcher(provider: Arc<ScriptedProvider>, concurrency: usize) -> Dispatcher {
        Dispatcher::new(
            Arc::new(Invoker::new(provider)),
            NonZeroUsize::new(concurrency).expect("non-zero"),
        )
    }

    #[tokio::test]
    async fn empty_batch_never_calls_back() {
        let provider = Arc::new(ScriptedProvider::reversing());
        let mut callbacks = 0;

        dispatcher(provider.clone(), 4)
            .run(requests(0), |_| callbacks += 1)
            .await;

        assert_eq!(callbacks, 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn every_request_is_delivered_once() {
        let provider = Arc::new(
            ScriptedProvider::reversing().with_delay(|_| Duration::from_millis(2)),
        );
        let mut seen = Vec::new();

        dispatcher(provider.clone(), 3)
            .run(requests(20), |result| seen.push(result.index()))
            .await;

        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert_eq!(provider.calls(), 20);
    }

    #[tokio::test]
    async fn in_flight_calls_never_exceed_limit() {
        let provider = Arc::new(
            ScriptedProvider::reversing().with_delay(|_| Duration::from_millis(5)),
        );

        dispatcher(provider.clone(), 4)
            .run(requests(32), |_| {})
            .await;

        assert!(provider.max_in_flight() <= 4);
        assert!(provider.max_in_flight() >= 2);
    }

    #[tokio::test]
    async fn cancelled_before_start_invokes_nothing() {
        let provider = Arc::new(ScriptedProvider::reversing());
        let token = CancellationToken::new();
        token.cancel();
        let mut statuses = Vec::new();

        dispatcher(provider.clone(), 2)
            .with_cancellation(token)
            .run(requests(5), |result| statuses.push(result.status()))
            .await;

        assert_eq!(provider.calls(), 0);
        assert_eq!(statuses, vec!["cancelled"; 5]);
    }

    #[tokio::test]
    async fn cancellation_lets_in_flight_calls_finish() {
        let provider = Arc::new(
            ScriptedProvider::reversing().with_delay(|_| Duration::from_millis(30)),
        );
        let token = CancellationToken::new();
        let trigger = token.clone();
        let mut results = Vec::new();

        dispatcher(provider.clone(), 2)
            .with_cancellation(token)
            .run(requests(6), |result| {
                results.push(result);
                trigger.cancel();
            })
            .await;

        assert_eq!(results.len(), 6);
        let completed = results.iter().filter(|r| r.succeeded()).count();
        assert_eq!(completed, provider.calls());
        assert!(completed >= 2 && completed < 6);
    }

    #[tokio::test]
    async fn abandon_policy_drops_in_flight_calls() {
        let provider = Arc::new(
            ScriptedProvider::reversing().with_delay(|_| Duration::from_secs(30)),
        );
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let mut statuses = Vec::new();

        dispatcher(provider.clone(), 2)
            .with_cancellation(token)
            .cancel_policy(CancelPolicy::Abandon)
            .run(requests(4), |result| statuses.push(result.status()))
            .await;

        assert_eq!(statuses, vec!["cancelled"; 4]);
        assert_eq!(provider.calls(), 2);
    }
}
