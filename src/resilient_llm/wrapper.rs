use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::{
    chat::ChatMessage,
    completion::{CompletionProvider, SamplingParams},
    error::EvalError,
};

use super::config::ResilienceConfig;

/// Decorator that retries transient failures of the wrapped provider using
/// exponential backoff.
///
/// The evaluator never retries on its own; wrapping the provider keeps the
/// retry policy out of the dispatcher.
pub struct ResilientProvider {
    inner: Arc<dyn CompletionProvider>,
    cfg: ResilienceConfig,
}

impl ResilientProvider {
    /// Creates a new resilient wrapper around an existing provider.
    pub fn new(inner: Arc<dyn CompletionProvider>, cfg: ResilienceConfig) -> Self {
        Self { inner, cfg }
    }

    async fn retry<F, Fut, T>(&self, mut op: F) -> Result<T, EvalError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EvalError>>,
    {
        let max_attempts = self.cfg.max_attempts.max(1);
        let mut last_err: Option<EvalError> = None;

        for attempt in 0..max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !Self::is_retryable(&err) => return Err(err),
                Err(err) => {
                    log::warn!(
                        "{} attempt {}/{} failed: {err}",
                        self.inner.model(),
                        attempt + 1,
                        max_attempts
                    );
                    last_err = Some(err);
                    if attempt + 1 < max_attempts {
                        self.backoff_sleep(attempt).await;
                    }
                }
            }
        }

        match last_err {
            Some(err) if max_attempts == 1 => Err(err),
            last => Err(EvalError::RetryExceeded {
                attempts: max_attempts,
                last_error: last.map(|e| e.to_string()).unwrap_or_default(),
            }),
        }
    }

    fn is_retryable(err: &EvalError) -> bool {
        match err {
            EvalError::Transport(_) => true,
            EvalError::Service(_) => true,
            EvalError::Status { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            EvalError::ResponseFormat { .. } => true,
            EvalError::Json(_) => true,
            EvalError::RetryExceeded { .. } => false,
            EvalError::InvalidRequest(_) => false,
            EvalError::Batch(_) => false,
        }
    }

    fn backoff_delay(&self, attempt_index: usize) -> u64 {
        let mut delay = self
            .cfg
            .base_delay_ms
            .saturating_mul(1u64 << attempt_index.min(16));
        delay = delay.min(self.cfg.max_delay_ms);
        if self.cfg.jitter {
            let span = (delay / 2).max(1);
            let jitter = ((attempt_index as u64)
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1))
                % span;
            delay = delay.saturating_sub(jitter);
        }
        delay
    }

    async fn backoff_sleep(&self, attempt_index: usize) {
        sleep(Duration::from_millis(self.backoff_delay(attempt_index))).await;
    }
}

#[async_trait]
impl CompletionProvider for ResilientProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        sampling: &SamplingParams,
    ) -> Result<String, EvalError> {
        self.retry(|| self.inner.complete(messages, sampling)).await
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FlakyProvider {
        calls: AtomicUsize,
        failures_before_success: usize,
        error: fn() -> EvalError,
    }

    #[async_trait]
    impl CompletionProvider for FlakyProvider {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _sampling: &SamplingParams,
        ) -> Result<String, EvalError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err((self.error)())
            } else {
                Ok("recovered".to_string())
            }
        }
    }

    fn fast_config(max_attempts: usize) -> ResilienceConfig {
        ResilienceConfig {
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 2,
            jitter: false,
        }
    }

    fn flaky(failures: usize, error: fn() -> EvalError) -> Arc<FlakyProvider> {
        Arc::new(FlakyProvider {
            calls: AtomicUsize::new(0),
            failures_before_success: failures,
            error,
        })
    }

    async fn complete(provider: &ResilientProvider) -> Result<String, EvalError> {
        provider
            .complete(
                &ChatMessage::instructions(None, "hi"),
                &SamplingParams::default(),
            )
            .await
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let inner = flaky(2, || EvalError::Transport("reset".into()));
        let provider = ResilientProvider::new(inner.clone(), fast_config(3));

        assert_eq!(complete(&provider).await.expect("recovers"), "recovered");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let inner = flaky(10, || EvalError::Service("HTTP 503".into()));
        let provider = ResilientProvider::new(inner.clone(), fast_config(2));

        let err = complete(&provider).await.unwrap_err();
        assert!(matches!(err, EvalError::RetryExceeded { attempts: 2, .. }));
        assert!(err.to_string().contains("HTTP 503"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_requests_are_not_retried() {
        let inner = flaky(10, || EvalError::InvalidRequest("bad".into()));
        let provider = ResilientProvider::new(inner.clone(), fast_config(5));

        let err = complete(&provider).await.unwrap_err();
        assert!(matches!(err, EvalError::InvalidRequest(_)));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_status_errors_are_not_retried() {
        let inner = flaky(10, || EvalError::Status {
            status: 401,
            body: "invalid api key".into(),
        });
        let provider = ResilientProvider::new(inner.clone(), fast_config(4));

        let err = complete(&provider).await.unwrap_err();
        assert!(matches!(err, EvalError::Status { status: 401, .. }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn throttling_and_server_statuses_are_retried() {
        let throttled = flaky(1, || EvalError::Status {
            status: 429,
            body: "slow down".into(),
        });
        let provider = ResilientProvider::new(throttled.clone(), fast_config(3));
        assert_eq!(complete(&provider).await.expect("recovers"), "recovered");
        assert_eq!(throttled.calls.load(Ordering::SeqCst), 2);

        let unavailable = flaky(1, || EvalError::Status {
            status: 503,
            body: "overloaded".into(),
        });
        let provider = ResilientProvider::new(unavailable.clone(), fast_config(3));
        assert_eq!(complete(&provider).await.expect("recovers"), "recovered");
        assert_eq!(unavailable.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn single_attempt_passes_error_through() {
        let inner = flaky(10, || EvalError::Transport("refused".into()));
        let provider = ResilientProvider::new(inner.clone(), fast_config(1));

        let err = complete(&provider).await.unwrap_err();
        assert!(matches!(err, EvalError::Transport(_)));
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        let provider = ResilientProvider::new(
            flaky(0, || EvalError::Transport(String::new())),
            ResilienceConfig {
                max_attempts: 5,
                base_delay_ms: 100,
                max_delay_ms: 350,
                jitter: false,
            },
        );
        assert_eq!(provider.backoff_delay(0), 100);
        assert_eq!(provider.backoff_delay(1), 200);
        assert_eq!(provider.backoff_delay(2), 350);
    }

    #[test]
    fn with_retries_counts_first_attempt() {
        assert_eq!(ResilienceConfig::with_retries(0).max_attempts, 1);
        assert_eq!(ResilienceConfig::with_retries(2).max_attempts, 3);
    }
}
