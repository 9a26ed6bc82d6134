//! Listing teasers projected from front matter

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_yaml::Value;

use super::document::Document;

const MISSING_NAME: &str = "missing name";
const MISSING_TITLE: &str = "missing title";
const MISSING_TEASER: &str = "missing teaser";

/// Display data for one document in a listing or page header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub name: String,
    pub title: String,
    pub date: DateTime<Utc>,
    /// Short German date, e.g. `21.5.2032`
    pub date_stamp: String,
    pub teaser: String,
}

impl Snippet {
    pub fn from_document(doc: &Document) -> Self {
        Self::from_document_at(doc, Utc::now())
    }

    /// Project a snippet, using `now` when the document carries no usable date
    pub fn from_document_at(doc: &Document, now: DateTime<Utc>) -> Self {
        let text = |key: &str| doc.front_matter.get(key).and_then(value_text);

        let date = doc
            .front_matter
            .get("date")
            .and_then(value_text)
            .and_then(|raw| parse_date(&raw))
            .unwrap_or(now);

        let name = if doc.name.is_empty() {
            MISSING_NAME.to_string()
        } else {
            doc.name.clone()
        };

        Self {
            name,
            title: text("title").unwrap_or_else(|| MISSING_TITLE.to_string()),
            date_stamp: date_stamp(&date),
            date,
            teaser: text("teaser").unwrap_or_else(|| MISSING_TEASER.to_string()),
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => value_text(&tagged.value),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn date_stamp(date: &DateTime<Utc>) -> String {
    format!("{}.{}.{}", date.day(), date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::document::tests::NOTE;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 5, 22, 19, 57, 18).unwrap()
    }

    #[test]
    fn test_full_front_matter() {
        let doc = Document::parse("testslug", NOTE).unwrap();
        let snippet = Snippet::from_document_at(&doc, fixed_now());

        assert_eq!(snippet.name, "testslug");
        assert_eq!(snippet.title, "A first test title");
        assert_eq!(snippet.teaser, "Best test teaser in the industry");
        assert_eq!(
            snippet.date,
            Utc.with_ymd_and_hms(2032, 5, 21, 0, 0, 0).unwrap()
        );
        assert_eq!(snippet.date_stamp, "21.5.2032");
    }

    #[test]
    fn test_defaults_for_bare_document() {
        let doc = Document::parse("", "## asdf").unwrap();
        let snippet = Snippet::from_document_at(&doc, fixed_now());

        assert_eq!(snippet.name, "missing name");
        assert_eq!(snippet.title, "missing title");
        assert_eq!(snippet.teaser, "missing teaser");
        assert_eq!(snippet.date, fixed_now());
        assert_eq!(snippet.date_stamp, "22.5.2023");
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(
            parse_date("2024-01-02T03:04:05+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 1, 4, 5).unwrap())
        );
        assert_eq!(
            parse_date("2024-01-02 03:04:05"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_unparsable_date_falls_back() {
        let doc = Document::parse("n", "---\ndate: someday\ntitle: 42\n---\n").unwrap();
        let snippet = Snippet::from_document_at(&doc, fixed_now());
        assert_eq!(snippet.date, fixed_now());
        assert_eq!(snippet.title, "42");
    }
}
