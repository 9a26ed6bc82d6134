//! Single document page

use tracing::debug;

use crate::config::AppState;
use crate::content::{Document, Snippet};
use crate::error::ServeError;

/// Render the page for request path `/<name>`
pub async fn render_document(path: &str, state: &AppState) -> Result<String, ServeError> {
    let name = document_path_name(path)?;
    let fetched = state.upstream.fetch(&format!("{name}.md")).await?;
    debug!(url = %fetched.url, bytes = fetched.body.len(), "document fetched");

    let doc = Document::parse(name, &fetched.body)?;
    let header = state.snippet.render_snippet(&Snippet::from_document(&doc));
    let body = state.markdown.render(&doc.markdown)?;

    Ok(state
        .template
        .render_page(&format!("{header}\n{body}"), &state.assets))
}

/// Document name for a request path, rejecting names that escape the resource
fn document_path_name(path: &str) -> Result<&str, ServeError> {
    let name = path.trim_start_matches('/').trim_end_matches('/');
    if name.is_empty() || name.split(['/', '\\']).any(is_parent_segment) {
        return Err(ServeError::NotFound(path.to_string()));
    }
    Ok(name)
}

fn is_parent_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path_name() {
        assert_eq!(document_path_name("/note").unwrap(), "note");
        assert_eq!(document_path_name("/note/").unwrap(), "note");
        assert_eq!(document_path_name("/topic/note").unwrap(), "topic/note");
        assert_eq!(document_path_name("/v1.2").unwrap(), "v1.2");
    }

    #[test]
    fn test_rejects_escaping_paths() {
        for path in [
            "/",
            "//",
            "/../secret",
            "/a/../../b",
            "/%2E%2e/x",
            "/a/.%2e",
            "/..\\secret",
            "/a\\..\\..\\b",
        ] {
            assert!(
                matches!(document_path_name(path), Err(ServeError::NotFound(_))),
                "{path} accepted"
            );
        }
    }
}
