use serde::Deserialize;
use std::collections::BTreeMap;

use super::{EvaluationConfig, LoggingConfig, ProviderConfig};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_provider: Option<String>,
    pub providers: BTreeMap<String, ProviderConfig>,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// True when any provider stores its key inline.
    pub fn holds_api_key(&self) -> bool {
        self.providers
            .values()
            .any(|provider| provider.api_key.is_some())
    }
}
