// Configuration module entry point
// Loads layered configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

use config::ConfigError;
use url::Url;

// Re-export public types
pub use state::AppState;
pub use types::{
    CacheConfig, Config, LogFormat, LoggingConfig, PerformanceConfig, RoutesConfig,
    ServerConfig, SiteConfig, UpstreamConfig,
};

/// Default config file, looked up without extension
const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from `$LUHMANN_CONFIG` or `config.toml` in the working directory
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("LUHMANN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: defaults, the file, `LUHMANN_*` variables,
    /// then the deployment variables `ZETTELKASTEN`, `PORT` and `KV`.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("LUHMANN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 128)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "compact")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("upstream.resource", "")?
            .set_default("upstream.timeout_ms", 10_000)?
            .set_default("upstream.max_concurrent_fetches", 8)?
            .set_default("cache.enabled", false)?
            .set_default("cache.ttl_ms", 5_000)?
            .set_override_option("upstream.resource", std::env::var("ZETTELKASTEN").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option(
                "cache.enabled",
                std::env::var("KV").ok().map(|kv| kv == "ENABLE"),
            )?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field constraints and normalise the resource URL
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.upstream.resource = normalize_resource(&self.upstream.resource)?;

        if self.cache.enabled && self.cache.ttl_ms == 0 {
            return Err(ConfigError::Message(
                "cache.ttl_ms must be positive when the cache is enabled".to_string(),
            ));
        }
        if self.upstream.max_concurrent_fetches == 0 {
            return Err(ConfigError::Message(
                "upstream.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

/// Resource URLs are joined with file names, so they must end in `/`
fn normalize_resource(resource: &str) -> Result<String, ConfigError> {
    let trimmed = resource.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Message(
            "upstream.resource is not set (use ZETTELKASTEN or LUHMANN_UPSTREAM__RESOURCE)"
                .to_string(),
        ));
    }

    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::Message(format!("upstream.resource '{trimmed}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Message(format!(
            "upstream.resource must be http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(with_slash)
}
