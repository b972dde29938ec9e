use serde::Deserialize;

use super::{DEFAULT_CONCURRENCY, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub concurrency: usize,
    /// Extra attempts per request; zero sends each prompt once.
    pub retries: usize,
    pub abandon_on_cancel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            concurrency: DEFAULT_CONCURRENCY,
            retries: 0,
            abandon_on_cancel: false,
        }
    }
}
