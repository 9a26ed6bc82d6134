// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

/// Log output format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub access_log: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Where documents come from
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL serving `sitemap.yaml` and `<name>.md`
    pub resource: String,
    pub timeout_ms: u64,
    pub max_concurrent_fetches: usize,
}

/// Reply cache (KV store) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_ms: u64,
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    #[serde(default = "default_favicon_paths")]
    pub favicon_paths: Vec<String>,
}

fn default_favicon_paths() -> Vec<String> {
    vec!["/favicon.ico".to_string()]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            favicon_paths: default_favicon_paths(),
        }
    }
}

/// Page chrome handed to the page template
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default)]
    pub stylesheet_links: Vec<String>,
    #[serde(default)]
    pub script_links: Vec<String>,
    #[serde(default)]
    pub css: String,
}

fn default_site_title() -> String {
    "Zettelkasten".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            stylesheet_links: Vec::new(),
            script_links: Vec::new(),
            css: String::new(),
        }
    }
}
