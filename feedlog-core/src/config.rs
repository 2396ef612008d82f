//! Configuration management for Feedlog.
//!
//! Configuration is layered: built-in defaults, an optional TOML file, and
//! process environment variables (highest priority). The merged [`Config`] is
//! then resolved into [`Settings`], which is what the bot actually runs with.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::access::AccessGate;
use crate::window::DayWindow;


/// Environment variable holding the Telegram bot token.
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";

/// Environment variable holding the comma-separated authorized user IDs.
pub const ENV_ALLOWED_USERS: &str = "ALLOWED_USERS";

/// Environment variable holding the database connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Environment variable holding the IANA time zone name.
pub const ENV_TIMEZONE: &str = "TIMEZONE";

/// Environment variable pointing at a config file.
pub const ENV_CONFIG_PATH: &str = "FEEDLOG_CONFIG";

/// Errors that can occur when loading or resolving configuration.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        /// Path to the configuration file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML parse error.
        source: toml::de::Error,
    },

    /// A required setting was not provided by any source.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// The configured time zone is not a known IANA zone identifier.
    #[error("unknown time zone: '{0}'")]
    InvalidTimezone(String),
}

/// Application configuration as merged from file and environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// IANA time zone used to decide where "today" starts. UTC when unset.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,

    /// Database settings.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Optional file logging. Stdout-only when absent.
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TelegramConfig {
    /// Bot token. Never logged.
    #[serde(default)]
    pub token: Option<String>,

    /// Telegram user IDs allowed to talk to the bot.
    #[serde(default)]
    pub allowed_users: Option<Vec<u64>>,
}

/// Database settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string, e.g. `sqlite:data/feedlog.db`.
    #[serde(default)]
    pub url: Option<String>,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Rolling file logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Directory the log files are written to.
    #[serde(default = "default_log_directory")]
    pub directory: String,

    /// Number of rotated files to keep.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    #[serde(default)]
    pub rotation: Rotation,
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_max_files() -> usize {
    7
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            max_files: default_max_files(),
            rotation: Rotation::default(),
        }
    }
}

/// Fully resolved runtime settings. Every required value is present and the
/// time zone has been validated.
#[derive(Clone)]
pub struct Settings {
    pub token: String,
    pub gate: AccessGate,
    pub database_url: String,
    pub window: DayWindow,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"<redacted>")
            .field("gate", &self.gate)
            .field("database_url", &self.database_url)
            .field("window", &self.window)
            .finish()
    }
}

impl Config {
    /// Load configuration from the file system.
    ///
    /// Priority order:
    /// 1. `explicit` path (from the command line)
    /// 2. `FEEDLOG_CONFIG` environment variable
    /// 3. `./config.toml` (local directory)
    /// 4. `~/.config/feedlog/config.toml` (user config)
    ///
    /// Returns the default (empty) config if no file is found. Environment
    /// overrides are not applied here; see [`Config::apply_env`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if a found file cannot be read.
    /// Returns [`ConfigError::ParseError`] if a found file is not valid TOML.
    pub fn load(explicit: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            let p = PathBuf::from(&path);
            if p.exists() {
                return Self::load_from(p);
            }
        }

        let local = PathBuf::from("config.toml");
        if local.exists() {
            return Self::load_from(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config/feedlog/config.toml");
            if user_config.exists() {
                return Self::load_from(user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read.
    /// Returns [`ConfigError::ParseError`] if the file is not valid TOML.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup. Set values win over
    /// whatever the file provided; empty values are treated as unset.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup(ENV_BOT_TOKEN) {
            self.telegram.get_or_insert_with(Default::default).token = Some(token);
        }
        if let Some(list) = lookup(ENV_ALLOWED_USERS) {
            self.telegram
                .get_or_insert_with(Default::default)
                .allowed_users = Some(parse_user_list(&list));
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.get_or_insert_with(Default::default).url = Some(url);
        }
        if let Some(tz) = lookup(ENV_TIMEZONE) {
            self.timezone = Some(tz);
        }
    }

    /// Resolve into runtime [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the token, the allowed-user list, or
    /// the database URL is absent, and [`ConfigError::InvalidTimezone`] if the
    /// time zone is set but unknown.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let telegram = self.telegram.as_ref();

        let token = telegram
            .and_then(|t| t.token.clone())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing(ENV_BOT_TOKEN))?;

        let allowed = telegram
            .and_then(|t| t.allowed_users.as_deref())
            .ok_or(ConfigError::Missing(ENV_ALLOWED_USERS))?;

        let database_url = self
            .database
            .as_ref()
            .and_then(|d| d.url.clone())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::Missing(ENV_DATABASE_URL))?;

        let window = DayWindow::from_name(self.timezone.as_deref())?;

        Ok(Settings {
            token,
            gate: AccessGate::new(allowed.iter().copied()),
            database_url,
            window,
        })
    }
}

/// Parse a comma-separated list of user IDs. Entries that are not valid
/// unsigned integers are dropped.
pub fn parse_user_list(list: &str) -> Vec<u64> {
    list.split(',')
        .filter_map(|entry| entry.trim().parse::<u64>().ok())
        .collect()
}
