//! Concrete completion endpoints.

pub mod openai_compatible;

pub use openai_compatible::{OpenAICompatible, OpenAICompatibleConfig};
