//! Batch evaluation of rendered prompts against a remote completion endpoint.
//!
//! The crate is built around the [`evaluator`] engine: a [`BatchJob`] holds an
//! ordered set of [`EvaluationRequest`]s, fans them out to a bounded worker
//! pool, contains every per-item failure at the [`Invoker`] boundary, and hands
//! back results in request order.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use prompt_eval::backends::{OpenAICompatible, OpenAICompatibleConfig};
//! use prompt_eval::completion::SamplingParams;
//! use prompt_eval::evaluator::{BatchJob, Invoker, RunOptions};
//!
//! # async fn demo() -> Result<(), prompt_eval::error::EvalError> {
//! let provider = OpenAICompatible::new(OpenAICompatibleConfig {
//!     base_url: "http://localhost:8000/v1".to_string(),
//!     model: "qwen2.5-7b-instruct".to_string(),
//!     api_key: None,
//!     timeout_seconds: Some(120),
//! })?;
//! let invoker = Arc::new(Invoker::new(Arc::new(provider)));
//!
//! let mut job = BatchJob::from_prompts(
//!     ["Summarize: ...", "Translate: ..."],
//!     Some("You are a careful assistant.".to_string()),
//!     SamplingParams::default(),
//!     3,
//! )?;
//! let report = job
//!     .run(invoker, RunOptions::new().progress(|p| eprintln!("{:.0}%", p * 100.0)))
//!     .await?;
//! for result in &report.results {
//!     println!("{}: {}", result.index(), result.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod chat;
pub mod completion;
pub mod error;
pub mod evaluator;
pub mod resilient_llm;

pub use completion::{CompletionProvider, SamplingParams};
pub use error::{EvalError, FailureKind};
pub use evaluator::{
    BatchJob, BatchReport, BatchState, CancelPolicy, EvaluationRequest, EvaluationResult,
    Invoker, Outcome, RunOptions,
};
