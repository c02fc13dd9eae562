/**
 * Server Configuration
 *
 * This module loads the `AppConfig` and opens the persistence backend.
 *
 * # Configuration Sources
 *
 * In increasing order of precedence:
 * 1. Built-in defaults
 * 2. TOML file named by `XFCHAT_CONFIG` (optional)
 * 3. Environment variables (a `.env` file is loaded by the binary)
 *
 * | env var | field |
 * |---------|-------|
 * | `SERVER_ADDR` | `bind_addr` (full `host:port`) |
 * | `SERVER_PORT` | `bind_addr` port on `0.0.0.0` |
 * | `JWT_SECRET` | `jwt_secret` |
 * | `DATABASE_URL` | `database_url` |
 * | `ECHO_TO_SENDER` | `echo_to_sender` |
 * | `CHANNEL_CAPACITY` | `channel_capacity` |
 * | `AUTH_TIMEOUT_SECS` | `auth_timeout_secs` |
 * | `TOKEN_LEEWAY_SECS` | `token_leeway_secs` |
 * | `CLEANUP_INTERVAL_SECS` | `cleanup_interval_secs` |
 *
 * # Error Handling
 *
 * Unlike optional services, configuration errors abort startup: there is no
 * sensible default for the token secret.
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use crate::backend::error::StoreError;
use crate::backend::store::{ChatStore, MemoryStore, PgStore};
use crate::shared::{AppConfig, AppConfigBuilder, ConfigError, FileConfig};

/// Environment variable naming the optional TOML configuration file
pub const CONFIG_FILE_ENV: &str = "XFCHAT_CONFIG";

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env_value(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: key,
                message: format!("cannot parse '{}'", raw),
            }),
        None => Ok(None),
    }
}

fn env_bind_addr() -> Result<Option<SocketAddr>, ConfigError> {
    if let Some(addr) = env_value("SERVER_ADDR") {
        return addr
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidAddr(addr));
    }
    Ok(parse_env::<u16>("SERVER_PORT")?.map(|port| SocketAddr::from(([0, 0, 0, 0], port))))
}

/// Apply environment overrides to `builder`
fn apply_env(mut builder: AppConfigBuilder) -> Result<AppConfigBuilder, ConfigError> {
    if let Some(addr) = env_bind_addr()? {
        builder = builder.bind_addr(addr);
    }
    if let Some(secret) = env_value("JWT_SECRET") {
        builder = builder.jwt_secret(secret);
    }
    if let Some(url) = env_value("DATABASE_URL") {
        builder = builder.database_url(url);
    }
    if let Some(echo) = parse_env::<bool>("ECHO_TO_SENDER")? {
        builder = builder.echo_to_sender(echo);
    }
    if let Some(capacity) = parse_env::<usize>("CHANNEL_CAPACITY")? {
        builder = builder.channel_capacity(capacity);
    }
    if let Some(secs) = parse_env::<u64>("AUTH_TIMEOUT_SECS")? {
        builder = builder.auth_timeout_secs(secs);
    }
    if let Some(secs) = parse_env::<u64>("TOKEN_LEEWAY_SECS")? {
        builder = builder.token_leeway_secs(secs);
    }
    if let Some(secs) = parse_env::<u64>("CLEANUP_INTERVAL_SECS")? {
        builder = builder.cleanup_interval_secs(secs);
    }
    Ok(builder)
}

/// Load the configuration file named by `XFCHAT_CONFIG`, if any
fn load_file() -> Result<Option<FileConfig>, ConfigError> {
    let Some(path) = env_value(CONFIG_FILE_ENV) else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::File(format!("{}: {}", path, e)))?;
    tracing::info!("[Config] Loaded configuration file {}", path);
    FileConfig::from_toml_str(&text).map(Some)
}

/// Load and validate the server configuration
///
/// # Errors
///
/// Returns `ConfigError` when a value cannot be parsed, the file cannot be
/// read, or validation fails (for example a missing `JWT_SECRET`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut builder = apply_env(AppConfig::builder())?;
    if let Some(file) = load_file()? {
        builder = builder.merge_file(file);
    }
    builder.build()
}

/// Open the persistence backend named by the configuration
///
/// With a `database_url` this connects to PostgreSQL and runs migrations;
/// without one it falls back to the in-memory store.
pub async fn load_store(config: &AppConfig) -> Result<Arc<dyn ChatStore>, StoreError> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(PgStore::connect(url).await?)),
        None => {
            tracing::warn!("[Store] DATABASE_URL not set. Using the in-memory store; data is lost on restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
