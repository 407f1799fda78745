//! Configuration management for docman-migrate using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::{is_mysql_url, redact_url_password};

/// Default Joomla table prefix of the legacy site.
pub const DEFAULT_TABLE_PREFIX: &str = "qxe79_";

/// View levels whose categories are migrated by default (Public, Guest).
pub const DEFAULT_VIEW_LEVELS: [i32; 2] = [1, 5];

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("No {0} database configured (set `{0}.url` or `{0}.host`/`{0}.database`)")]
    MissingDatabase(&'static str),
    #[error("Not a MySQL URL for the {side} database: {url}")]
    UnsupportedDatabase { side: &'static str, url: String },
    #[error("No target_file_path configured (set `target_file_path` or TARGET_FILE_PATH)")]
    MissingTargetFilePath,
    #[error("Invalid table prefix '{0}': only ASCII letters, digits and '_' are allowed")]
    InvalidTablePrefix(String),
}

/// Connection settings for one database, as a URL or as separate parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; wins over the separate parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl DatabaseConfig {
    /// Connection URL, built from the parts when no URL is given.
    pub fn connection_url(&self) -> Option<String> {
        if let Some(url) = self.url.as_ref().filter(|u| !u.is_empty()) {
            return Some(url.clone());
        }

        let host = self.host.as_deref().filter(|h| !h.is_empty())?;
        let database = self.database.as_deref().filter(|d| !d.is_empty())?;
        let port = self.port.unwrap_or(DEFAULT_MYSQL_PORT);

        let auth = match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(password)
            ),
            (Some(user), None) => format!("{}@", urlencoding::encode(user)),
            _ => String::new(),
        };

        Some(format!(
            "mysql://{auth}{host}:{port}/{}",
            urlencoding::encode(database)
        ))
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Legacy DocMan database.
    #[serde(default)]
    pub source: DatabaseConfig,
    /// Valor database.
    #[serde(default)]
    pub target: DatabaseConfig,
    /// Base path written in front of each attachment file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_file_path: Option<String>,
    /// Joomla table prefix of the DocMan tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_prefix: Option<String>,
    /// View levels whose lawsuit categories are migrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_view_levels: Option<Vec<i32>>,
    /// Path the config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers docman-migrate config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("docman-migrate").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring discovered config: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => {
                // No config file found, env overrides still apply
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }
}

/// Resolved, validated settings for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source_url: String,
    pub target_url: String,
    pub target_file_path: PathBuf,
    pub table_prefix: String,
    pub allowed_view_levels: Vec<i32>,
}

impl Settings {
    /// Build settings from a config, with environment overrides on top.
    pub fn resolve(config: &Config, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let source_url = env
            .source_database_url
            .clone()
            .or_else(|| config.source.connection_url())
            .ok_or(ConfigError::MissingDatabase("source"))?;
        let target_url = env
            .target_database_url
            .clone()
            .or_else(|| config.target.connection_url())
            .ok_or(ConfigError::MissingDatabase("target"))?;

        for (side, url) in [("source", &source_url), ("target", &target_url)] {
            if !is_mysql_url(url) {
                return Err(ConfigError::UnsupportedDatabase {
                    side,
                    url: redact_url_password(url),
                });
            }
        }

        let target_file_path = env
            .target_file_path
            .clone()
            .or_else(|| config.target_file_path.clone())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingTargetFilePath)?;

        let table_prefix = env
            .table_prefix
            .clone()
            .or_else(|| config.table_prefix.clone())
            .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string());
        validate_table_prefix(&table_prefix)?;

        let allowed_view_levels = config
            .allowed_view_levels
            .clone()
            .unwrap_or_else(|| DEFAULT_VIEW_LEVELS.to_vec());

        Ok(Self {
            source_url,
            target_url,
            target_file_path,
            table_prefix,
            allowed_view_levels,
        })
    }

    /// Source URL safe for display.
    pub fn display_source_url(&self) -> String {
        redact_url_password(&self.source_url)
    }

    /// Target URL safe for display.
    pub fn display_target_url(&self) -> String {
        redact_url_password(&self.target_url)
    }
}

/// The table prefix is interpolated into SQL, so only identifier characters pass.
pub fn validate_table_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidTablePrefix(prefix.to_string()))
    }
}

/// Values from environment variables, which take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub source_database_url: Option<String>,
    pub target_database_url: Option<String>,
    pub target_file_path: Option<String>,
    pub table_prefix: Option<String>,
}

impl EnvOverrides {
    /// Read SOURCE_DATABASE_URL, TARGET_DATABASE_URL, TARGET_FILE_PATH and
    /// DOCMAN_TABLE_PREFIX. Empty values are ignored.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|s| !s.is_empty());
        Self {
            source_database_url: var("SOURCE_DATABASE_URL"),
            target_database_url: var("TARGET_DATABASE_URL"),
            target_file_path: var("TARGET_FILE_PATH"),
            table_prefix: var("DOCMAN_TABLE_PREFIX"),
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Load config from file sources only.
async fn load_file_config(options: &LoadOptions) -> Result<Config, ConfigError> {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path).await;
    }

    // Priority 2: Auto-discover via prefer
    Ok(Config::load().await)
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = load_file_config(&options).await?;
    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let settings = Settings::resolve(&config, &EnvOverrides::from_env())?;
    Ok((settings, config))
}
