use std::sync::Arc;

use prompt_eval::backends::{OpenAICompatible, OpenAICompatibleConfig};
use prompt_eval::completion::CompletionProvider;
use prompt_eval::resilient_llm::{ResilienceConfig, ResilientProvider};

use super::resolve::Endpoint;

/// Builds the client for `endpoint`, wrapped in a retry layer when
/// `retries` is positive.
pub fn build_provider(
    endpoint: Endpoint,
    retries: usize,
) -> anyhow::Result<Arc<dyn CompletionProvider>> {
    let client = OpenAICompatible::new(OpenAICompatibleConfig {
        base_url: endpoint.base_url,
        model: endpoint.model,
        api_key: endpoint.api_key,
        timeout_seconds: endpoint.timeout_seconds,
    })?;
    log::debug!("provider {} sends to {}", endpoint.name, client.base_url());
    let provider: Arc<dyn CompletionProvider> = Arc::new(client);
    if retries == 0 {
        return Ok(provider);
    }
    log::debug!("provider {} retries failed requests up to {retries} times", endpoint.name);
    Ok(Arc::new(ResilientProvider::new(
        provider,
        ResilienceConfig::with_retries(retries),
    )))
}
