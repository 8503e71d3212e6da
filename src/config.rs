use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::MAX_PAGE_SIZE;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub geolocation: GeolocationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Optional shared L2 tier; the L1 cache is always on
    pub redis_url: Option<String>,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_l1_cache_size")]
    pub l1_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: default_cache_ttl(),
            l1_cache_size: default_l1_cache_size(),
        }
    }
}

fn default_cache_ttl() -> u64 { 30 }
fn default_l1_cache_size() -> u64 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default)]
    pub require_shared_tag: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_radius_km: default_radius_km(),
            require_shared_tag: false,
        }
    }
}

fn default_limit() -> usize { 20 }
fn default_radius_km() -> f64 { 50.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_cookie_name() -> String { "token".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct GeolocationSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_geolocation_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_geolocation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeolocationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_geolocation_endpoint(),
            timeout_secs: default_geolocation_timeout(),
        }
    }
}

fn default_geolocation_endpoint() -> String { "http://ip-api.com/json".to_string() }
fn default_geolocation_timeout() -> u64 { 3 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MATCHA__)
    /// 5. DATABASE_URL, if set
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCHA__SERVER__PORT -> server.port
            .add_source(environment());

        with_database_url(builder)?.build()?.try_deserialize::<Self>()?.checked()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment());

        with_database_url(builder)?.build()?.try_deserialize::<Self>()?.checked()
    }

    /// Reject discovery defaults that every request would trip over
    fn checked(self) -> Result<Self, ConfigError> {
        let discovery = &self.discovery;
        if discovery.default_limit == 0 || discovery.default_limit > MAX_PAGE_SIZE {
            return Err(ConfigError::Message(format!(
                "discovery.default_limit must be within 1..={}, got {}",
                MAX_PAGE_SIZE, discovery.default_limit
            )));
        }
        if !discovery.default_radius_km.is_finite() || discovery.default_radius_km < 0.0 {
            return Err(ConfigError::Message(format!(
                "discovery.default_radius_km must be a non-negative number, got {}",
                discovery.default_radius_km
            )));
        }
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MATCHA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// The conventional DATABASE_URL wins over any configured value
fn with_database_url(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => builder.set_override("database.url", url),
        Err(_) => Ok(builder),
    }
}
