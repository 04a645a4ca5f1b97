use crate::error::{AppError, Result};
use crate::triage::{MatchStrategy, HIGH_THRESHOLD, MEDIUM_THRESHOLD, SENTIMENT_WEIGHT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// State backend configuration
    #[serde(default)]
    pub state: StateConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Priority classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: TRIAGE_)
            .add_source(
                config::Environment::with_prefix("TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// State backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database
    pub path: Option<PathBuf>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::Sled,
            path: Some(PathBuf::from(default_state_path())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    #[default]
    Sled,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding the token signing secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Fallback signing secret used when the environment variable is unset
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Session token lifetime (hours)
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Recreate the built-in admin and responder accounts at startup
    #[serde(default = "default_true")]
    pub seed_default_users: bool,
}

impl AuthConfig {
    /// Resolve the token signing secret
    pub fn resolve_secret(&self) -> Result<String> {
        if let Ok(secret) = std::env::var(&self.jwt_secret_env) {
            if !secret.is_empty() {
                return Ok(secret);
            }
        }

        match &self.jwt_secret {
            Some(secret) if !secret.is_empty() => {
                tracing::warn!(
                    env_var = %self.jwt_secret_env,
                    "Token secret not found in environment, using configured fallback"
                );
                Ok(secret.clone())
            }
            _ => Err(AppError::Configuration(format!(
                "No token secret: set {} or auth.jwt_secret",
                self.jwt_secret_env
            ))),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            bcrypt_cost: default_bcrypt_cost(),
            seed_default_users: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Weight applied to the negative / neutral sentiment mass
    #[serde(default = "default_sentiment_weight")]
    pub sentiment_weight: f64,

    /// Exclusive lower bound on the high score for `high`
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,

    /// Exclusive lower bound on the medium score for `medium`
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: f64,

    /// Keyword matching strategy
    #[serde(default)]
    pub match_strategy: MatchStrategy,

    /// Optional cap on description length (characters); unset accepts any length
    #[serde(default)]
    pub max_description_len: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sentiment_weight: default_sentiment_weight(),
            high_threshold: default_high_threshold(),
            medium_threshold: default_medium_threshold(),
            match_strategy: MatchStrategy::default(),
            max_description_len: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_state_path() -> String {
    "./data/state".to_string()
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_sentiment_weight() -> f64 {
    SENTIMENT_WEIGHT
}

fn default_high_threshold() -> f64 {
    HIGH_THRESHOLD
}

fn default_medium_threshold() -> f64 {
    MEDIUM_THRESHOLD
}


fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 5000);
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_token_ttl_hours(), 24);
        assert!(default_true());
    }

    #[test]
    fn test_classifier_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.sentiment_weight, 0.3);
        assert_eq!(config.high_threshold, 0.5);
        assert_eq!(config.medium_threshold, 0.3);
        assert_eq!(config.match_strategy, MatchStrategy::Substring);
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.http_port, 5000);
        assert_eq!(config.state.backend, StateBackend::Sled);
        assert_eq!(config.classifier.match_strategy, MatchStrategy::Substring);
        assert_eq!(config.classifier.sentiment_weight, 0.3);
    }

    #[test]
    fn test_secret_fallback() {
        let auth = AuthConfig {
            jwt_secret_env: "TRIAGE_TEST_SECRET_THAT_IS_NEVER_SET".to_string(),
            jwt_secret: Some("fallback".to_string()),
            ..Default::default()
        };
        assert_eq!(auth.resolve_secret().unwrap(), "fallback");

        let auth = AuthConfig {
            jwt_secret: None,
            ..auth
        };
        assert!(auth.resolve_secret().is_err());
    }

    #[test]
    fn test_storage_backend_default() {
        assert_eq!(StateBackend::default(), StateBackend::Sled);
    }
}
