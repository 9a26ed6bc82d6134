//! Home page listing
//!
//! Reads the sitemap, fetches every listed document and renders one snippet per
//! document that carries front matter, in sitemap order.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::AppState;
use crate::content::{document_name, has_front_matter, Document, Snippet};
use crate::error::ServeError;
use crate::upstream::Fetched;

pub const SITEMAP: &str = "sitemap.yaml";

/// Render the listing page
pub async fn render_home(state: &AppState) -> Result<String, ServeError> {
    let sitemap = state.upstream.fetch(SITEMAP).await.map_err(|err| match err {
        ServeError::UpstreamStatus { status, .. } => ServeError::SitemapStatus { status },
        other => other,
    })?;
    if sitemap.is_html() {
        return Err(ServeError::InvalidContentType {
            resource: SITEMAP.to_string(),
            content_type: sitemap.content_type.unwrap_or_default(),
        });
    }
    let files = parse_sitemap(&sitemap.body)?;
    debug!(documents = files.len(), "sitemap loaded");

    // `buffered` keeps sitemap order while fetching ahead
    let fetched: Vec<(String, Result<Fetched, ServeError>)> = stream::iter(files)
        .map(|file| async move {
            let result = state.upstream.fetch(&file).await;
            (file, result)
        })
        .buffered(state.upstream.max_concurrent())
        .collect()
        .await;

    let listing: String = fetched
        .into_iter()
        .filter_map(|(file, result)| teaserify(&file, result))
        .map(|snippet| state.snippet.render_snippet(&snippet))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(state.template.render_page(&listing, &state.assets))
}

/// Sitemap body as an ordered, non-empty list of file names
pub fn parse_sitemap(body: &str) -> Result<Vec<String>, ServeError> {
    let files: Vec<String> = serde_yaml::from_str(body).map_err(ServeError::Sitemap)?;
    if files.is_empty() {
        return Err(ServeError::EmptySitemap);
    }
    Ok(files)
}

/// Snippet for one listed document, `None` if it has to be left out
fn teaserify(file: &str, result: Result<Fetched, ServeError>) -> Option<Snippet> {
    let fetched = match result {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(file, error = %err, "skipping document");
            return None;
        }
    };

    if !has_front_matter(&fetched.body) {
        debug!(file, "skipping document without front matter");
        return None;
    }

    match Document::parse(document_name(file), &fetched.body) {
        Ok(doc) => Some(Snippet::from_document(&doc)),
        Err(err) => {
            warn!(file, error = %err, "skipping document with broken front matter");
            None
        }
    }
}
