//! API configuration
//!
//! Collections address a REST API rooted at one base URL. The deployment
//! environment also controls how cache ages are counted: in development a
//! "minute" of `max_age_minutes` lasts one second, so lists refetch quickly
//! while iterating.
//!
//! # Example
//!
//! ```no_run
//! use composable_collections::config::ApiConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // API_URL is required, CONFIG_ENV defaults to development
//! let api = ApiConfig::from_env()?;
//! println!("Fetching from {}", api.url("tags/", &Default::default()));
//! # Ok(())
//! # }
//! ```

use crate::pagination::QueryParams;
use crate::record::RecordId;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
    /// Invalid environment value
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Pre-production
    Staging,
    /// Production
    Production,
}

impl Environment {
    /// Parse an environment name
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvironment`] for unknown names.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }

    /// Check if this is the development environment
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Where collections are fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every collection path is appended to (`http://host/api/v1/`)
    pub base_url: String,
    /// Deployment environment
    pub environment: Environment,
}

impl ApiConfig {
    /// Configuration for `base_url` in development
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            environment: Environment::Development,
        }
    }

    /// Set the deployment environment
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Load from `API_URL` and `CONFIG_ENV`
    ///
    /// # Errors
    ///
    /// Returns an error if `API_URL` is missing, `CONFIG_ENV` names an unknown
    /// environment, or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// See [`ApiConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("API_URL").ok_or_else(|| ConfigError::EnvVarNotSet("API_URL".to_string()))?;
        let environment = lookup("CONFIG_ENV")
            .map(|name| Environment::parse(&name))
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            base_url,
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is empty or not an absolute URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::ValidationError("base_url cannot be empty".to_string()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|error| ConfigError::ParseError(format!("base_url {}: {error}", self.base_url)))?;
        Ok(())
    }

    /// `base_url + path + ?query`
    #[must_use]
    pub fn url(&self, path: &str, query: &QueryParams) -> String {
        format!("{}{path}{}", self.base_url, query.to_query_string())
    }

    /// `base_url + path + id/`
    #[must_use]
    pub fn record_url(&self, path: &str, id: &RecordId) -> String {
        format!("{}{path}{id}/", self.base_url)
    }

    /// Cache lifetime for `minutes`
    ///
    /// Counted in seconds in development.
    #[must_use]
    pub fn max_age(&self, minutes: u32) -> Duration {
        if self.environment.is_development() {
            Duration::seconds(i64::from(minutes))
        } else {
            Duration::minutes(i64::from(minutes))
        }
    }
}
