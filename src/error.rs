//! Request error taxonomy
//!
//! Every failure on the request path is a `ServeError`. The variant alone decides
//! the HTTP status of the error page; messages are only ever logged.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    /// Connection refused, DNS failure, TLS failure and friends
    #[error("upstream unreachable while fetching {resource}: {message}")]
    UpstreamUnreachable { resource: String, message: String },

    #[error("upstream timed out while fetching {resource}")]
    UpstreamTimeout { resource: String },

    #[error("upstream answered {status} for {resource}")]
    UpstreamStatus { resource: String, status: u16 },

    #[error("{resource} has content-type '{content_type}', expected yaml or markdown")]
    InvalidContentType {
        resource: String,
        content_type: String,
    },

    #[error("failed to read upstream body of {resource}: {message}")]
    UpstreamBody { resource: String, message: String },

    #[error("sitemap is not a yaml list of file names: {0}")]
    Sitemap(#[source] serde_yaml::Error),

    #[error("sitemap lists no documents")]
    EmptySitemap,

    /// Any non-200 answer for the sitemap itself
    #[error("upstream answered {status} for the sitemap")]
    SitemapStatus { status: u16 },

    #[error("front matter of {name} could not be parsed: {source}")]
    FrontMatter {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("front matter of {name} uses unsupported format {format}")]
    UnsupportedFrontMatter { name: String, format: &'static str },

    #[error("document {0} not found")]
    NotFound(String),

    #[error("render failed: {0}")]
    Render(String),
}

impl ServeError {
    /// HTTP status sent to the client for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UpstreamStatus { status: 404, .. } | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamStatus { status: 503, .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamUnreachable { .. }
            | Self::UpstreamStatus { .. }
            | Self::InvalidContentType { .. }
            | Self::UpstreamBody { .. }
            | Self::Sitemap(_)
            | Self::EmptySitemap
            | Self::SitemapStatus { .. } => StatusCode::BAD_GATEWAY,
            Self::UnsupportedFrontMatter { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::FrontMatter { .. } | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text of the error page. Never includes internal details.
    pub fn public_message(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::BAD_GATEWAY => "Bad Gateway",
            StatusCode::SERVICE_UNAVAILABLE => "Service Unavailable",
            StatusCode::GATEWAY_TIMEOUT => "Gateway Timeout",
            StatusCode::NOT_IMPLEMENTED => "Not Implemented",
            _ => "Internal Server Error",
        }
    }
}
