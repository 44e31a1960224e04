//! Configuration loading, validation, and management for Codeward.
//!
//! Loads configuration from `~/.codeward/config.toml` with environment
//! variable overrides. Validated once at startup and immutable afterwards.

use codeward_core::{InvalidProfilePolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.codeward/config.toml`. Directory settings left
/// unset are derived from `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root for profiles and standards (default `~/.codeward`)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Profile sources and selection
    #[serde(default)]
    pub profiles: ProfilesConfig,

    /// Standards document tree
    #[serde(default)]
    pub standards: StandardsConfig,

    /// Profile and document cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retry behaviour for filesystem reads
    #[serde(default)]
    pub io: IoConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_data_dir() -> PathBuf {
    AppConfig::config_dir()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesConfig {
    /// Base/template directories, loaded in order. Empty = `<data_dir>/profiles/templates`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_dirs: Vec<PathBuf>,

    /// Custom directory whose profiles replace base ones. Default `<data_dir>/profiles/custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_dir: Option<PathBuf>,

    /// Flat fallback directory, loaded last. Default `<data_dir>/profiles`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_dir: Option<PathBuf>,

    /// Profile used when nothing more specific applies
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// What to do with a profile document that fails validation
    #[serde(default)]
    pub invalid_policy: InvalidProfilePolicy,
}

fn default_profile() -> String {
    "java-spring".into()
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            base_dirs: vec![],
            custom_dir: None,
            fallback_dir: None,
            default_profile: default_profile(),
            invalid_policy: InvalidProfilePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardsConfig {
    /// Root of the markdown tree. Default `<data_dir>/standards`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live in seconds. 0 = cache until invalidated.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    25
}
fn default_max_delay_ms() -> u64 {
    1000
}
fn default_multiplier() -> f64 {
    2.0
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl IoConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    42618
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.codeward/config.toml).
    ///
    /// Environment variables override the file:
    /// - `CODEWARD_DATA_DIR`
    /// - `CODEWARD_DEFAULT_PROFILE`
    /// - `CODEWARD_CACHE_TTL_SECS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from a specific path, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if let Ok(dir) = std::env::var("CODEWARD_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(profile) = std::env::var("CODEWARD_DEFAULT_PROFILE") {
            config.profiles.default_profile = profile;
        }

        if let Ok(ttl) = std::env::var("CODEWARD_CACHE_TTL_SECS") {
            config.cache.ttl_secs = ttl.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "CODEWARD_CACHE_TTL_SECS must be a whole number of seconds, got '{ttl}'"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".codeward")
    }

    /// Base/template profile directories, in load order.
    pub fn profile_base_dirs(&self) -> Vec<PathBuf> {
        if self.profiles.base_dirs.is_empty() {
            vec![self.data_dir.join("profiles").join("templates")]
        } else {
            self.profiles.base_dirs.clone()
        }
    }

    pub fn profile_custom_dir(&self) -> PathBuf {
        self.profiles
            .custom_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("profiles").join("custom"))
    }

    pub fn profile_fallback_dir(&self) -> PathBuf {
        self.profiles
            .fallback_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("profiles"))
    }

    pub fn standards_root(&self) -> PathBuf {
        self.standards
            .root
            .clone()
            .unwrap_or_else(|| self.data_dir.join("standards"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.profiles.default_profile.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "profiles.default_profile must not be empty".into(),
            ));
        }

        if self.io.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "io.max_attempts must be at least 1".into(),
            ));
        }

        if self.io.multiplier < 1.0 {
            return Err(ConfigError::ValidationError(
                "io.multiplier must be >= 1.0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a commented default config TOML string (for `codeward doctor --init`).
    pub fn default_toml() -> String {
        let body = toml::to_string_pretty(&Self::default()).unwrap_or_default();
        let mut out = String::from(
            "# Codeward configuration.\n\
             # Environment overrides: CODEWARD_DATA_DIR, CODEWARD_DEFAULT_PROFILE,\n\
             # CODEWARD_CACHE_TTL_SECS.\n\n\
             # Root for profiles/ and standards/.\n",
        );
        for line in body.lines() {
            if let Some(comment) = section_comment(line.trim()) {
                out.push_str(comment);
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

fn section_comment(header: &str) -> Option<&'static str> {
    let comment = match header {
        "[profiles]" => {
            "# Profile sources. base_dirs, custom_dir and fallback_dir default to\n\
             # <data_dir>/profiles/templates, <data_dir>/profiles/custom and <data_dir>/profiles.\n\
             # invalid_policy: \"skip\" logs bad documents, \"abort\" fails the load.\n"
        }
        "[standards]" => "# Markdown standards tree. root defaults to <data_dir>/standards.\n",
        "[cache]" => "# Seconds before profiles and standards are re-read. 0 caches until invalidated.\n",
        "[io]" => "# Retries for transient filesystem errors, with exponential backoff.\n",
        "[gateway]" => "# HTTP gateway started by `codeward serve`.\n",
        _ => return None,
    };
    Some(comment)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profiles: ProfilesConfig::default(),
            standards: StandardsConfig::default(),
            cache: CacheConfig::default(),
            io: IoConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
