use serde::Serialize;

use crate::error::EvalError;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2_000;
const MAX_TEMPERATURE: f32 = 2.0;

/// Sampling parameters shared by every request of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    temperature: f32,
    max_tokens: u32,
}

impl SamplingParams {
    /// Creates validated sampling parameters.
    ///
    /// `temperature` must lie in `[0, 2]` and `max_tokens` must be positive.
    pub fn new(temperature: f32, max_tokens: u32) -> Result<Self, EvalError> {
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(EvalError::InvalidRequest(format!(
                "temperature must be within [0, {MAX_TEMPERATURE}], got {temperature}"
            )));
        }
        if max_tokens == 0 {
            return Err(EvalError::InvalidRequest(
                "max_tokens must be positive".to_string(),
            ));
        }
        Ok(Self {
            temperature,
            max_tokens,
        })
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 1)]
    #[case(0.7, 2_000)]
    #[case(2.0, 8_000)]
    fn accepts_values_in_range(#[case] temperature: f32, #[case] max_tokens: u32) {
        let params = SamplingParams::new(temperature, max_tokens).expect("valid params");
        assert_eq!(params.temperature(), temperature);
        assert_eq!(params.max_tokens(), max_tokens);
    }

    #[rstest]
    #[case(-0.1, 100)]
    #[case(2.01, 100)]
    #[case(f32::NAN, 100)]
    #[case(0.5, 0)]
    fn rejects_values_out_of_range(#[case] temperature: f32, #[case] max_tokens: u32) {
        let err = SamplingParams::new(temperature, max_tokens).unwrap_err();
        assert!(matches!(err, EvalError::InvalidRequest(_)));
    }

    #[test]
    fn defaults_match_evaluation_defaults() {
        let params = SamplingParams::default();
        assert_eq!(params.temperature(), 0.7);
        assert_eq!(params.max_tokens(), 2_000);
    }
}
