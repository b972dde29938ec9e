//! Aggregate statistics for a finished batch.

use std::time::Duration;

use super::result::{EvaluationResult, Outcome};

/// Counts and latencies over every result of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Number of requests in the batch
    pub total: usize,
    /// Requests answered by the endpoint
    pub succeeded: usize,
    /// Requests whose call failed
    pub failed: usize,
    /// Requests cut short by cancellation
    pub cancelled: usize,
    /// Time from dispatch of the first request to delivery of the last result
    pub wall_time: Duration,
    /// Mean call latency over requests that reached the endpoint
    pub mean_latency: Duration,
    /// Slowest call latency
    pub max_latency: Duration,
}

impl BatchSummary {
    pub fn from_results(results: &[EvaluationResult], wall_time: Duration) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            wall_time,
            ..Default::default()
        };
        let mut latency_sum = Duration::ZERO;
        let mut timed = 0u32;

        for result in results {
            match result.outcome() {
                Outcome::Completed(_) => summary.succeeded += 1,
                Outcome::Failed { .. } => summary.failed += 1,
                Outcome::Cancelled => {
                    summary.cancelled += 1;
                    continue;
                }
            }
            latency_sum += result.elapsed();
            timed += 1;
            summary.max_latency = summary.max_latency.max(result.elapsed());
        }

        if timed > 0 {
            summary.mean_latency = latency_sum / timed;
        }
        summary
    }

    /// Share of requests that succeeded (0.0 - 1.0).
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            self.succeeded as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// Completed requests per second of wall time.
    pub fn throughput(&self) -> f64 {
        let secs = self.wall_time.as_secs_f64();
        if secs > 0.0 {
            (self.succeeded + self.failed) as f64 / secs
        } else {
            0.0
        }
    }
}
