//! The remote completion capability the evaluator calls into.

mod sampling;
mod traits;

pub use sampling::SamplingParams;
pub use traits::CompletionProvider;
