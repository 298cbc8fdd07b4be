//! Configuration for the `serial-session` tool.
//!
//! TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `SERIAL_SESSION_CONFIG` environment variable (explicit path)
//! 2. `./serial-session.toml` (current directory)
//! 3. `~/.config/serial-session/serial-session.toml` (XDG on Linux/macOS)
//! 4. `%APPDATA%\serial-session\serial-session.toml` (Windows)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `SERIAL_SESSION_<SECTION>_<KEY>`, e.g.
//! `SERIAL_SESSION_SERIAL_DEFAULT_BAUD=115200` or
//! `SERIAL_SESSION_LOGGING_LEVEL=debug`.
//!
//! # Example
//!
//! ```rust,no_run
//! use serial_session::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let options = loader.config().session_options("arduino", None);
//! println!("{} @ {}", options.path, options.baud_rate);
//! # Ok::<(), serial_session::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, SerialConfig};
