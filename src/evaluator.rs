//! Bounded-concurrency batch evaluation.
//!
//! A [`BatchJob`] fans its requests out to a pool of workers owned by the
//! [`Dispatcher`]. Each worker runs one [`Invoker`] call at a time, and a single
//! aggregator loop hands finished results to the [`Collector`], which puts them
//! back in request order and reports progress.

#[path = "evaluator/request.rs"]
mod request;

#[path = "evaluator/result.rs"]
mod result;

#[path = "evaluator/invoker.rs"]
mod invoker;

#[path = "evaluator/worker.rs"]
mod worker;

#[path = "evaluator/dispatcher.rs"]
mod dispatcher;

#[path = "evaluator/collector.rs"]
mod collector;

#[path = "evaluator/summary.rs"]
mod summary;

#[path = "evaluator/batch.rs"]
mod batch;

#[cfg(test)]
#[path = "evaluator/mock.rs"]
mod mock;


pub use batch::{BatchJob, BatchReport, BatchState, RunOptions};
pub use collector::{Collector, ProgressSink};
pub use dispatcher::{CancelPolicy, Dispatcher};
pub use invoker::Invoker;
pub use request::EvaluationRequest;
pub use result::{EvaluationResult, Outcome, CANCELLED_MARKER, ERROR_MARKER};
pub use summary::BatchSummary;
