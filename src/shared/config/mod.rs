//! Application configuration module
//!
//! Provides the server configuration type, its builder, and the partial
//! file representation merged in from an optional TOML file.

use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: SocketAddr,
    /// HMAC secret used to verify bearer tokens
    pub jwt_secret: String,
    /// PostgreSQL URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Deliver direct messages back to the sender's own channel
    pub echo_to_sender: bool,
    /// Buffered events per broadcast channel
    pub channel_capacity: usize,
    /// Seconds an unauthenticated connection may stay open
    pub auth_timeout_secs: u64,
    /// Clock skew tolerated when checking token expiry
    pub token_leeway_secs: u64,
    /// Period of the idle channel / lock pruning task
    pub cleanup_interval_secs: u64,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.auth_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default, Clone)]
pub struct AppConfigBuilder {
    bind_addr: Option<SocketAddr>,
    jwt_secret: Option<String>,
    database_url: Option<String>,
    echo_to_sender: Option<bool>,
    channel_capacity: Option<usize>,
    auth_timeout_secs: Option<u64>,
    token_leeway_secs: Option<u64>,
    cleanup_interval_secs: Option<u64>,
}

impl AppConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn echo_to_sender(mut self, echo: bool) -> Self {
        self.echo_to_sender = Some(echo);
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn auth_timeout_secs(mut self, secs: u64) -> Self {
        self.auth_timeout_secs = Some(secs);
        self
    }

    pub fn token_leeway_secs(mut self, secs: u64) -> Self {
        self.token_leeway_secs = Some(secs);
        self
    }

    pub fn cleanup_interval_secs(mut self, secs: u64) -> Self {
        self.cleanup_interval_secs = Some(secs);
        self
    }

    /// Overlay values from a configuration file; values already set win
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        self.bind_addr = self.bind_addr.or(file.bind_addr);
        self.jwt_secret = self.jwt_secret.or(file.jwt_secret);
        self.database_url = self.database_url.or(file.database_url);
        self.echo_to_sender = self.echo_to_sender.or(file.echo_to_sender);
        self.channel_capacity = self.channel_capacity.or(file.channel_capacity);
        self.auth_timeout_secs = self.auth_timeout_secs.or(file.auth_timeout_secs);
        self.token_leeway_secs = self.token_leeway_secs.or(file.token_leeway_secs);
        self.cleanup_interval_secs = self.cleanup_interval_secs.or(file.cleanup_interval_secs);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::InvalidAddr(DEFAULT_BIND_ADDR.to_string()))?,
        };
        let config = AppConfig {
            bind_addr,
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("jwt_secret"))?,
            database_url: self.database_url.filter(|url| !url.trim().is_empty()),
            echo_to_sender: self.echo_to_sender.unwrap_or(true),
            channel_capacity: self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY),
            auth_timeout_secs: self.auth_timeout_secs.unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS),
            token_leeway_secs: self.token_leeway_secs.unwrap_or(0),
            cleanup_interval_secs: self
                .cleanup_interval_secs
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Partial configuration as read from a TOML file
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind_addr: Option<SocketAddr>,
    pub jwt_secret: Option<String>,
    pub database_url: Option<String>,
    pub echo_to_sender: Option<bool>,
    pub channel_capacity: Option<usize>,
    pub auth_timeout_secs: Option<u64>,
    pub token_leeway_secs: Option<u64>,
    pub cleanup_interval_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::File(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid address: {0}")]
    InvalidAddr(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("config file error: {0}")]
    File(String),
}
