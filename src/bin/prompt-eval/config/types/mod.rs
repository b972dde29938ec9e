mod app;
mod evaluation;
mod logging;
mod provider;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_CONCURRENCY: usize = 3;
const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

pub use app::AppConfig;
pub use evaluation::EvaluationConfig;
pub use logging::LoggingConfig;
pub use provider::ProviderConfig;
