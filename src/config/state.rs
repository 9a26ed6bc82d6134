// Application state module
// Everything a request handler needs, shared behind an Arc

use std::sync::Arc;
use std::time::Duration;

use crate::content::{
    MarkdownRenderer, PageAssets, PageTemplate, SimpleSnippet, SimpleTemplate, SnippetTemplate,
};
use crate::store::{MemoryStore, ReplyCache};
use crate::upstream::{ClientError, UpstreamClient};

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
    /// Present only when `cache.enabled` is set
    pub cache: Option<ReplyCache>,
    pub markdown: MarkdownRenderer,
    pub template: Arc<dyn PageTemplate>,
    pub snippet: Arc<dyn SnippetTemplate>,
    pub assets: PageAssets,
}

impl AppState {
    /// Build state with the default templates and an in-memory KV store
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_templates(
            config,
            Arc::new(SimpleTemplate),
            Arc::new(SimpleSnippet),
        )
    }

    /// Build state with caller supplied page and snippet templates
    pub fn with_templates(
        config: &Config,
        template: Arc<dyn PageTemplate>,
        snippet: Arc<dyn SnippetTemplate>,
    ) -> Result<Self, ClientError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let markdown = MarkdownRenderer::new(Some(upstream.base().clone()));

        let cache = config.cache.enabled.then(|| {
            ReplyCache::new(
                Arc::new(MemoryStore::new()),
                Duration::from_millis(config.cache.ttl_ms),
            )
        });

        Ok(Self {
            config: config.clone(),
            upstream,
            cache,
            markdown,
            template,
            snippet,
            assets: PageAssets::from(&config.site),
        })
    }
}
