use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::config::{ConfigPaths, LoggingConfig};

/// Starts file logging; `RUST_LOG` overrides `logging.level`. The returned
/// handle must stay alive for the rest of the run.
pub fn init_logging(config: &LoggingConfig, paths: &ConfigPaths) -> anyhow::Result<LoggerHandle> {
    let file = FileSpec::try_from(paths.log_file(config))?;
    let handle = Logger::try_with_env_or_str(&config.level)?
        .log_to_file(file)
        .duplicate_to_stderr(stderr_echo(config))
        .rotate(
            Criterion::Size(config.rotate_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.rotate_keep),
        )
        .start()?;
    log::debug!("logging to {}", paths.log_file(config).display());
    Ok(handle)
}

fn stderr_echo(config: &LoggingConfig) -> Duplicate {
    if config.stderr {
        Duplicate::Warn
    } else {
        Duplicate::None
    }
}
