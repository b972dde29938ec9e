use secrecy::SecretString;

use crate::config::{AppConfig, ProviderConfig};

/// A fully resolved endpoint, ready to be turned into a client.
#[derive(Debug)]
pub struct Endpoint {
    pub name: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<SecretString>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no provider selected; pass --provider or set default_provider in the config")]
    MissingProvider,
    #[error("provider `{0}` is not configured")]
    UnknownProvider(String),
    #[error("provider `{0}` has no base_url")]
    MissingBaseUrl(String),
    #[error("provider `{0}` has no model; set one in the config or pass --model")]
    MissingModel(String),
    #[error("environment variable `{var}` for provider `{provider}` is not set")]
    MissingKeyEnv { provider: String, var: String },
}

/// Splits `name` or `name:model`.
pub fn parse_provider_string(raw: &str) -> Option<(&str, Option<&str>)> {
    let mut parts = raw.splitn(2, ':');
    let provider = parts.next()?.trim();
    if provider.is_empty() {
        return None;
    }
    let model = parts.next().map(str::trim).filter(|v| !v.is_empty());
    Some((provider, model))
}

/// Picks the provider from `--provider`, then `default_provider`, then the
/// only configured provider. `--model` beats a model given in the selector,
/// which beats the configured one.
pub fn resolve_endpoint(
    selector: Option<&str>,
    model_override: Option<&str>,
    config: &AppConfig,
) -> Result<Endpoint, ResolveError> {
    let selector = selector
        .or(config.default_provider.as_deref())
        .map(str::to_string)
        .or_else(|| single_provider(config))
        .ok_or(ResolveError::MissingProvider)?;
    let (name, selector_model) =
        parse_provider_string(&selector).ok_or(ResolveError::MissingProvider)?;
    let provider = config
        .providers
        .get(name)
        .ok_or_else(|| ResolveError::UnknownProvider(name.to_string()))?;

    let base_url = provider
        .base_url
        .clone()
        .ok_or_else(|| ResolveError::MissingBaseUrl(name.to_string()))?;
    let model = model_override
        .or(selector_model)
        .map(str::to_string)
        .or_else(|| provider.model.clone())
        .ok_or_else(|| ResolveError::MissingModel(name.to_string()))?;

    Ok(Endpoint {
        name: name.to_string(),
        base_url,
        model,
        api_key: api_key(name, provider)?,
        timeout_seconds: provider.timeout_seconds,
    })
}

fn single_provider(config: &AppConfig) -> Option<String> {
    let mut names = config.providers.keys();
    match (names.next(), names.next()) {
        (Some(name), None) => Some(name.clone()),
        _ => None,
    }
}

fn api_key(name: &str, provider: &ProviderConfig) -> Result<Option<SecretString>, ResolveError> {
    if let Some(key) = provider.api_key.as_ref() {
        return Ok(Some(SecretString::new(key.clone())));
    }
    let Some(var) = provider.api_key_env.as_ref() else {
        return Ok(None);
    };
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(Some(SecretString::new(value))),
        _ => Err(ResolveError::MissingKeyEnv {
            provider: name.to_string(),
            var: var.clone(),
        }),
    }
}
