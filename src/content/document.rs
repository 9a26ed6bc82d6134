//! Markdown documents and their front matter

use serde_yaml::Mapping;

use crate::error::ServeError;

/// Front matter as parsed YAML, keyed by field name
pub type FrontMatter = Mapping;

/// A fetched markdown document split into metadata and body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub front_matter: FrontMatter,
    pub markdown: String,
}

/// Leading metadata block of a markdown file
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    Yaml { front: &'a str, body: &'a str },
    Unsupported(&'static str),
    Absent,
}

impl Document {
    /// Split `raw` into front matter and markdown body
    ///
    /// Only YAML front matter delimited by `---` lines is understood. A document
    /// without any front matter parses to an empty map.
    pub fn parse(name: &str, raw: &str) -> Result<Self, ServeError> {
        let (front_matter, markdown) = match split_block(raw) {
            Block::Yaml { front, body } => (parse_front_matter(name, front)?, body),
            Block::Unsupported(format) => {
                return Err(ServeError::UnsupportedFrontMatter {
                    name: name.to_string(),
                    format,
                })
            }
            Block::Absent => {
                tracing::warn!(document = name, "document doesn't contain front matter");
                (Mapping::new(), strip_bom(raw))
            }
        };

        Ok(Self {
            name: name.to_string(),
            front_matter,
            markdown: markdown.to_string(),
        })
    }
}

/// Whether `raw` starts with a front matter block in any recognised format
pub fn has_front_matter(raw: &str) -> bool {
    !matches!(split_block(raw), Block::Absent)
}

/// Document name for a file name: everything before the last extension
///
/// `note.md` becomes `note`, `v1.2.md` becomes `v1.2`. Names without an
/// extension are kept as they are.
pub fn document_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

fn parse_front_matter(name: &str, front: &str) -> Result<FrontMatter, ServeError> {
    if front.trim().is_empty() {
        return Ok(Mapping::new());
    }
    serde_yaml::from_str(front).map_err(|source| ServeError::FrontMatter {
        name: name.to_string(),
        source,
    })
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

fn split_block(raw: &str) -> Block<'_> {
    let raw = strip_bom(raw);
    let (first_line, rest) = match raw.split_once('\n') {
        Some((line, rest)) => (line.trim_end_matches('\r'), rest),
        None => return Block::Absent,
    };

    let (delimiter, format) = match first_line.trim_end() {
        "---" | "---yaml" | "---yml" => ("---", None),
        "+++" => ("+++", Some("toml")),
        "---toml" => ("---", Some("toml")),
        "---json" => ("---", Some("json")),
        _ => return Block::Absent,
    };

    let Some((front, body)) = find_closing(rest, delimiter) else {
        return Block::Absent;
    };

    match format {
        None => Block::Yaml { front, body },
        Some(format) => Block::Unsupported(format),
    }
}

/// Find the line consisting of `delimiter` and split around it
fn find_closing<'a>(rest: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((front, body));
        }
        offset += line.len();
    }
    None
}
