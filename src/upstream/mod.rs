//! Upstream resource client
//!
//! Fetches the sitemap and markdown files from the configured resource and
//! turns transport failures into [`ServeError`] variants.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::ServeError;

/// Errors building the client at startup
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid resource url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// A successfully fetched upstream file
#[derive(Debug, Clone)]
pub struct Fetched {
    pub url: Url,
    pub content_type: Option<String>,
    pub body: String,
}

impl Fetched {
    /// True when the upstream served an HTML page instead of a data file
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
    }
}

pub struct UpstreamClient {
    client: Client,
    base: Url,
    max_concurrent: usize,
}

impl UpstreamClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&cfg.resource)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base,
            max_concurrent: cfg.max_concurrent_fetches.max(1),
        })
    }

    /// Base URL every file name is resolved against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Upper bound on simultaneous document fetches for one listing
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Fetch `name` relative to the resource and require a `200 OK`
    pub async fn fetch(&self, name: &str) -> Result<Fetched, ServeError> {
        let url = self.base.join(name).map_err(|e| ServeError::UpstreamUnreachable {
            resource: name.to_string(),
            message: e.to_string(),
        })?;
        // `..`, `\` and absolute names can resolve outside the resource
        if !url.as_str().starts_with(self.base.as_str()) {
            return Err(ServeError::NotFound(name.to_string()));
        }
        debug!(%url, "fetching upstream resource");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(name, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ServeError::UpstreamStatus {
                resource: name.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ServeError::UpstreamTimeout {
                    resource: name.to_string(),
                }
            } else {
                ServeError::UpstreamBody {
                    resource: name.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(Fetched {
            url,
            content_type,
            body,
        })
    }
}

fn classify(resource: &str, err: &reqwest::Error) -> ServeError {
    if err.is_timeout() {
        ServeError::UpstreamTimeout {
            resource: resource.to_string(),
        }
    } else {
        ServeError::UpstreamUnreachable {
            resource: resource.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{unreachable_base, MockUpstream};

    fn client(resource: &str) -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            resource: resource.to_string(),
            timeout_ms: 500,
            max_concurrent_fetches: 0,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let upstream = MockUpstream::builder()
            .file("note.md", "text/markdown", "# hi")
            .start()
            .await;
        let fetched = client(&upstream.base()).fetch("note.md").await.unwrap();

        assert_eq!(fetched.body, "# hi");
        assert_eq!(fetched.content_type.as_deref(), Some("text/markdown"));
        assert!(!fetched.is_html());
        assert!(fetched.url.as_str().ends_with("/note.md"));
    }

    #[tokio::test]
    async fn test_fetch_missing_is_status_error() {
        let upstream = MockUpstream::builder().start().await;
        let err = client(&upstream.base()).fetch("nope.md").await.unwrap_err();
        assert!(matches!(
            err,
            ServeError::UpstreamStatus { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_stays_inside_resource() {
        let upstream = MockUpstream::builder()
            .file("zettel/note.md", "text/markdown", "inside")
            .file("secret.md", "text/markdown", "outside")
            .start()
            .await;
        let client = client(&upstream.url("zettel/"));

        assert_eq!(client.fetch("note.md").await.unwrap().body, "inside");
        for name in [
            "../secret.md",
            "..\\secret.md",
            "/secret.md",
            "http://other.example/x.md",
        ] {
            let err = client.fetch(name).await.unwrap_err();
            assert!(matches!(err, ServeError::NotFound(_)), "{name} fetched");
        }
        assert_eq!(upstream.hits(), 1);
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let base = unreachable_base().await;
        let err = client(&base).fetch("sitemap.yaml").await.unwrap_err();
        assert!(matches!(err, ServeError::UpstreamUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let upstream = MockUpstream::builder()
            .file("slow.md", "text/markdown", "late")
            .delay(Duration::from_secs(2))
            .start()
            .await;
        let err = client(&upstream.base()).fetch("slow.md").await.unwrap_err();
        assert!(matches!(err, ServeError::UpstreamTimeout { .. }));
    }

    #[test]
    fn test_concurrency_floor() {
        assert_eq!(client("http://127.0.0.1:9/").max_concurrent(), 1);
    }

    #[test]
    fn test_is_html() {
        let fetched = |ct: Option<&str>| Fetched {
            url: Url::parse("http://x/sitemap.yaml").unwrap(),
            content_type: ct.map(ToString::to_string),
            body: String::new(),
        };
        assert!(fetched(Some("text/html")).is_html());
        assert!(fetched(Some("Text/HTML; charset=utf-8")).is_html());
        assert!(!fetched(Some("application/yaml")).is_html());
        assert!(!fetched(None).is_html());
    }
}
