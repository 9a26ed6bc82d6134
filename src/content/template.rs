//! Page and snippet templates
//!
//! Both are trait objects on the application state so embedders can swap the
//! markup without touching the handlers.

use std::fmt::Write;

use crate::config::SiteConfig;

use super::snippet::Snippet;

/// External assets and inline style for the page chrome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAssets {
    pub title: String,
    pub stylesheet_links: Vec<String>,
    pub script_links: Vec<String>,
    pub css: String,
}

impl From<&SiteConfig> for PageAssets {
    fn from(site: &SiteConfig) -> Self {
        Self {
            title: site.title.clone(),
            stylesheet_links: site.stylesheet_links.clone(),
            script_links: site.script_links.clone(),
            css: site.css.clone(),
        }
    }
}

/// Wraps rendered content into a full HTML document
pub trait PageTemplate: Send + Sync {
    fn render_page(&self, body: &str, assets: &PageAssets) -> String;
}

/// Renders one snippet
pub trait SnippetTemplate: Send + Sync {
    fn render_snippet(&self, snippet: &Snippet) -> String;
}

/// Default page: centred 800px column styled as a markdown body
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTemplate;

impl PageTemplate for SimpleTemplate {
    fn render_page(&self, body: &str, assets: &PageAssets) -> String {
        let mut stylesheets = String::new();
        for href in &assets.stylesheet_links {
            let _ = write!(
                stylesheets,
                "\n    <link rel=\"stylesheet\" href=\"{}\" />",
                escape_html(href)
            );
        }

        let mut scripts = String::new();
        for src in &assets.script_links {
            let _ = write!(
                scripts,
                "\n    <script type=\"module\" src=\"{}\"></script>",
                escape_html(src)
            );
        }

        format!(
            r#"<!doctype html>
<html lang=en>
  <head>
    <meta charset=utf-8>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>{stylesheets}
    <style>
      main {{
        max-width: 800px;
        margin: 0 auto;
      }}
      {css}
    </style>{scripts}
  </head>
  <body>
    <main data-color-mode="light" data-light-theme="light" data-dark-theme="dark" class="markdown-body">
{body}
    </main>
  </body>
</html>
"#,
            title = escape_html(&assets.title),
            css = assets.css,
        )
    }
}

/// Default snippet: linked title, dates and teaser in a `<section>`
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSnippet;

impl SnippetTemplate for SimpleSnippet {
    fn render_snippet(&self, snippet: &Snippet) -> String {
        let datetime = snippet.date.format("%a, %d %b %Y %H:%M:%S GMT");
        format!(
            r#"<section>
  <h2><a href="/{name}">{title}</a></h2>
  <time datetime="{datetime}">{stamp}</time>
  <span>{teaser}</span>
  <span> - </span><time datetime="{datetime}">{ymd}</time>
</section>"#,
            name = escape_html(&snippet.name),
            title = escape_html(&snippet.title),
            stamp = escape_html(&snippet.date_stamp),
            teaser = escape_html(&snippet.teaser),
            ymd = snippet.date.format("%Y/%-m/%-d"),
        )
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
