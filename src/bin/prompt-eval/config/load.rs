use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::types::AppConfig;

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub paths: ConfigPaths,
    pub config_exists: bool,
}

/// Reads the config file, falling back to defaults when it does not exist,
/// and makes sure the log directory is there.
pub fn load_config(path_override: Option<PathBuf>) -> Result<LoadedConfig, ConfigError> {
    let paths = ConfigPaths::resolve(path_override)?;
    let config = read_config(&paths.config_file)?;
    let config_exists = config.is_some();
    let config = config.unwrap_or_default();
    if config.holds_api_key() {
        restrict_to_owner(&paths.config_file)?;
    }
    if let Some(log_dir) = paths.log_file(&config.logging).parent() {
        create_dir(log_dir)?;
    }
    Ok(LoadedConfig {
        config,
        paths,
        config_exists,
    })
}

/// `None` when the file is absent.
fn read_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn create_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::Prepare {
        path: dir.to_path_buf(),
        source,
    })
}

/// Inline API keys must not be readable by other users.
fn restrict_to_owner(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let Ok(metadata) = fs::metadata(path) else {
            return Ok(());
        };
        let mut perms = metadata.permissions();
        if perms.mode() & 0o077 != 0 {
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).map_err(|source| ConfigError::Prepare {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
