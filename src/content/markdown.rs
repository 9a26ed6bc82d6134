//! Markdown to HTML

use comrak::nodes::{AstNode, NodeValue};
use comrak::{format_html, parse_document, Arena, Options};
use url::Url;

use crate::error::ServeError;

/// GitHub flavoured markdown renderer
///
/// Relative image sources are resolved against the media base URL so that
/// pictures stored next to the notes upstream keep working.
pub struct MarkdownRenderer {
    options: Options<'static>,
    sanitizer: ammonia::Builder<'static>,
    media_base: Option<Url>,
}

impl MarkdownRenderer {
    pub fn new(media_base: Option<Url>) -> Self {
        let mut options = Options::default();
        let ext = &mut options.extension;
        ext.strikethrough = true;
        ext.table = true;
        ext.autolink = true;
        ext.tasklist = true;
        ext.footnotes = true;
        // Raw HTML is passed through here and cleaned by ammonia afterwards
        options.render.r#unsafe = true;

        let mut sanitizer = ammonia::Builder::default();
        sanitizer.add_generic_attributes(&["id", "class"]);
        sanitizer.add_tag_attributes("input", &["type", "checked", "disabled"]);
        sanitizer.add_tags(&["input"]);

        Self {
            options,
            sanitizer,
            media_base,
        }
    }

    pub fn render(&self, markdown: &str) -> Result<String, ServeError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        if let Some(base) = &self.media_base {
            rebase_images(root, base);
        }

        let mut html = String::new();
        format_html(root, &self.options, &mut html)
            .map_err(|err| ServeError::Render(err.to_string()))?;
        Ok(self.sanitizer.clean(&html).to_string())
    }
}

fn rebase_images<'a>(root: &'a AstNode<'a>, base: &Url) {
    for node in root.descendants() {
        let mut data = node.data.borrow_mut();
        if let NodeValue::Image(link) = &mut data.value {
            if let Some(absolute) = resolve_media(base, &link.url) {
                link.url = absolute;
            }
        }
    }
}

/// Absolute URL for a relative media reference, `None` if already absolute
fn resolve_media(base: &Url, src: &str) -> Option<String> {
    if src.is_empty() || Url::parse(src).is_ok() {
        return None;
    }
    base.join(src).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(Some(Url::parse("https://notes.example/zettel/").unwrap()))
    }

    #[test]
    fn test_renders_gfm() {
        let html = renderer()
            .render("## Heading\n\n- one\n- two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~")
            .unwrap();
        assert!(html.contains("<h2>Heading</h2>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_relative_images_are_rebased() {
        let html = renderer().render("![cat](img/cat.png)").unwrap();
        assert!(html.contains(r#"src="https://notes.example/zettel/img/cat.png""#));
    }

    #[test]
    fn test_absolute_images_untouched() {
        let html = renderer().render("![dog](https://cdn.example/dog.png)").unwrap();
        assert!(html.contains(r#"src="https://cdn.example/dog.png""#));
    }

    #[test]
    fn test_relative_links_untouched() {
        let html = renderer().render("[next](other-note)").unwrap();
        assert!(html.contains(r#"href="other-note""#));
    }

    #[test]
    fn test_scripts_are_stripped() {
        let html = renderer()
            .render("hello <script>alert(1)</script> <em>there</em>")
            .unwrap();
        assert!(!html.contains("<script"));
        assert!(html.contains("<em>there</em>"));
    }

    #[test]
    fn test_resolve_media() {
        let base = Url::parse("https://notes.example/zettel/").unwrap();
        assert_eq!(
            resolve_media(&base, "a.png").as_deref(),
            Some("https://notes.example/zettel/a.png")
        );
        assert_eq!(
            resolve_media(&base, "/root.png").as_deref(),
            Some("https://notes.example/root.png")
        );
        assert_eq!(resolve_media(&base, "data:image/png;base64,AAAA"), None);
        assert_eq!(resolve_media(&base, ""), None);
    }
}
