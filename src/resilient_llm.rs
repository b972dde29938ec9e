#[path = "resilient_llm/config.rs"]
mod config;

#[path = "resilient_llm/wrapper.rs"]
mod wrapper;

pub use config::ResilienceConfig;
pub use wrapper::ResilientProvider;
