//! Logger module
//!
//! Installs the global `tracing` subscriber and provides the helpers for:
//! - Server lifecycle logging
//! - Access logging
//! - Connection errors

use std::net::SocketAddr;
use std::time::Duration;

use hyper::{Method, StatusCode};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

use crate::config::{Config, LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log level '{level}': {source}")]
    Filter {
        level: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level` when set.
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn level_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|source| LoggerError::Filter {
        level: level.to_string(),
        source,
    })
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    info!(
        %addr,
        resource = %config.upstream.resource,
        cache = config.cache.enabled,
        ttl_ms = config.cache.ttl_ms,
        "server started"
    );
    if let Some(workers) = config.server.workers {
        info!(workers, "worker threads");
    }
    if let Some(max) = config.performance.max_connections {
        info!(max_connections = max, "connection limit");
    }
}

pub fn log_connection_error(err: &hyper::Error) {
    warn!(error = %err, "failed to serve connection");
}

/// One access log line per request
pub fn log_access(method: &Method, path: &str, status: StatusCode, bytes: u64, elapsed: Duration) {
    info!(
        target: "access",
        %method,
        path,
        status = status.as_u16(),
        bytes,
        elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        "request"
    );
}
