//! Logger configuration.
//!
//! A [`LoggerConfig`] is built once by the process entry point, either in
//! code or from a TOML file, and handed to [`crate::Logger::new`] or
//! [`crate::init`]. It is not consulted again after construction.

use crate::record::Level;
use crate::router::Route;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Identity reported for loggers synthesized without configuration
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Logger configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggerConfig {
    pub service_name: String,

    pub service_version: String,

    #[serde(default)]
    pub environment: Environment,

    /// Records below this level are dropped
    #[serde(default)]
    pub level: Level,

    /// Wrap warning and error lines in ANSI colors on the console
    #[serde(default = "default_console_color")]
    pub console_color: bool,

    #[serde(default)]
    pub rotation: RotationConfig,
}

/// Deployment mode, which decides where records are written
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Staging,
    Production,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Environment {
    /// Map a literal environment tag; anything unrecognized is `Unspecified`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            _ => Environment::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Unspecified => "unspecified",
        }
    }
}

/// Rotating file parameters
///
/// Zero for `max_age_days` or `max_backups` means no limit. Zero for
/// `max_size_mb` selects the 100 MB default.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotationConfig {
    #[serde(default)]
    pub file_path: PathBuf,

    #[serde(default)]
    pub max_size_mb: u64,

    #[serde(default)]
    pub max_age_days: u64,

    #[serde(default)]
    pub max_backups: usize,

    #[serde(default)]
    pub compress: bool,
}

// Default value functions
fn default_console_color() -> bool {
    true
}

impl LoggerConfig {
    /// Build a configuration with defaults for everything but identity
    pub fn new(service_name: impl Into<String>, service_version: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            environment: Environment::default(),
            level: Level::default(),
            console_color: default_console_color(),
            rotation: RotationConfig::default(),
        }
    }

    /// Configuration used when a logger is needed before any was supplied
    ///
    /// Routed to the console only, so it never needs a file path.
    pub fn unknown_service() -> Self {
        Self::new(UNKNOWN_SERVICE, UNKNOWN_SERVICE).with_environment(Environment::Local)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationConfig) -> Self {
        self.rotation = rotation;
        self
    }

    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: LoggerConfig = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!("Loaded logger config from {:?}", path);
        Ok(config)
    }

    /// Check the invariants construction relies on
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(Error::Config("service_name must not be empty".into()));
        }

        let route = Route::for_environment(self.environment);
        if route.writes_file() && self.rotation.file_path.as_os_str().is_empty() {
            return Err(Error::Config(format!(
                "environment '{}' writes to a file but rotation.file_path is empty",
                self.environment.as_str()
            )));
        }

        Ok(())
    }
}
