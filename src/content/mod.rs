//! Content pipeline: front matter, snippets, markdown and page templates

pub mod document;
pub mod markdown;
pub mod snippet;
pub mod template;

pub use document::{document_name, has_front_matter, Document};
pub use markdown::MarkdownRenderer;
pub use snippet::Snippet;
pub use template::{PageAssets, PageTemplate, SimpleSnippet, SimpleTemplate, SnippetTemplate};
