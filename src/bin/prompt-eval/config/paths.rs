use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::types::LoggingConfig;

const APP_DIR: &str = "prompt-eval";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "prompt-eval.log";

/// Where the config file lives and where logs go by default.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub logs_dir: PathBuf,
}

impl ConfigPaths {
    /// `~/.config/prompt-eval/config.toml` unless `config_override` is given.
    /// Logs default to `~/.local/share/prompt-eval/logs`.
    pub fn resolve(config_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let home = dirs::home_dir();
        let config_file = match config_override {
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::NotAFile(path))
            }
            Some(path) => path,
            None => home
                .as_deref()
                .ok_or(ConfigError::MissingHome)?
                .join(".config")
                .join(APP_DIR)
                .join(CONFIG_FILE),
        };
        let logs_dir = match home {
            Some(home) => home.join(".local").join("share").join(APP_DIR).join("logs"),
            None => config_dir_of(&config_file).join("logs"),
        };
        Ok(Self {
            config_file,
            logs_dir,
        })
    }

    /// Log file named by `logging.path`, or the default under `logs_dir`.
    pub fn log_file(&self, logging: &LoggingConfig) -> PathBuf {
        logging
            .path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.logs_dir.join(LOG_FILE))
    }
}

/// A bare file name lives in the working directory.
fn config_dir_of(file: &Path) -> PathBuf {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
