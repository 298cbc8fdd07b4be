//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SERIAL_SESSION";

const CONFIG_FILE_NAME: &str = "serial-session.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SERIAL_SESSION_CONFIG";

const APP_DIR_NAME: &str = "serial-session";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SERIAL_SESSION_CONFIG` environment variable (explicit path)
    /// 2. `./serial-session.toml` (current directory)
    /// 3. `~/.config/serial-session/serial-session.toml` (XDG on Linux/macOS)
    /// 4. `%APPDATA%\serial-session\serial-session.toml` (Windows)
    /// 5. Built-in defaults (no file required)
    ///
    /// Environment variables override file values; the result is validated.
    pub fn load() -> ConfigResult<Self> {
        match resolve_config_path() {
            Some(path) => Self::load_from(path),
            None => Self::with_defaults(),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let config = finish(load_from_file(&path)?)?;
        debug!(path = %path.display(), "configuration loaded");

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Built-in defaults plus environment overrides, without reading a file.
    pub fn with_defaults() -> ConfigResult<Self> {
        let config = finish(Config::default())?;
        debug!("no config file found, using defaults");

        Ok(Self {
            config_path: None,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

fn finish(mut config: Config) -> ConfigResult<Config> {
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. XDG config directory (Linux/macOS) or APPDATA (Windows)
    if let Some(app_config) = get_default_config_path() {
        if app_config.exists() {
            return Some(app_config);
        }
    }

    None
}

/// Get the platform-specific config directory.
fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::Parse)
}

fn env_var(key: &str) -> Option<(String, String)> {
    let var = format!("{ENV_PREFIX}_{key}");
    std::env::var(&var).ok().map(|val| (var, val))
}

fn parse_env<T: FromStr>(var: &str, val: &str, what: &str) -> ConfigResult<T> {
    val.trim()
        .parse()
        .map_err(|_| ConfigError::env(var, format!("Invalid {what}")))
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern: `SERIAL_SESSION_<SECTION>_<KEY>`
/// For example:
/// - `SERIAL_SESSION_SERIAL_DEFAULT_BAUD=115200`
/// - `SERIAL_SESSION_SERIAL_ENCODING=latin1`
/// - `SERIAL_SESSION_LOGGING_FORMAT=json`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    let serial = &mut config.serial;
    if let Some((var, val)) = env_var("SERIAL_DEFAULT_BAUD") {
        serial.default_baud = parse_env(&var, &val, "baud rate")?;
    }
    if let Some((var, val)) = env_var("SERIAL_DEFAULT_TIMEOUT_MS") {
        serial.default_timeout_ms = parse_env(&var, &val, "timeout")?;
    }
    if let Some((var, val)) = env_var("SERIAL_DEFAULT_READ_SIZE") {
        serial.default_read_size = parse_env(&var, &val, "read size")?;
    }
    if let Some((var, val)) = env_var("SERIAL_ENCODING") {
        serial.encoding = parse_env(&var, &val, "encoding")?;
    }
    if let Some((var, val)) = env_var("SERIAL_DATA_BITS") {
        serial.data_bits = parse_env(&var, &val, "data bits")?;
    }
    if let Some((var, val)) = env_var("SERIAL_STOP_BITS") {
        serial.stop_bits = parse_env(&var, &val, "stop bits")?;
    }
    if let Some((_, val)) = env_var("SERIAL_PARITY") {
        serial.parity = val;
    }
    if let Some((_, val)) = env_var("SERIAL_FLOW_CONTROL") {
        serial.flow_control = val;
    }

    let logging = &mut config.logging;
    if let Some((_, val)) = env_var("LOGGING_LEVEL") {
        logging.level = val;
    }
    if let Some((var, val)) = env_var("LOGGING_FORMAT") {
        logging.format = parse_env(&var, &val, "log format")?;
    }

    Ok(())
}

/// Get the default config directory for creating new config files.
pub fn get_default_config_dir() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join(APP_DIR_NAME))
}

/// Get the default config file path for creating new config files.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}
