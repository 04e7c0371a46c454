//! Tagged Field Values
//!
//! The remote store is loosely typed: the same column can arrive as a bare
//! scalar, a single-element list (lookup and rollup columns), or a list of
//! attachment objects. Every raw value is decoded into one `FieldValue`
//! variant at the store boundary so business logic never branches on raw
//! JSON shapes.

use serde_json::Value;

use crate::store::models::{Attachment, SubmissionFile};

/// Canonical decode of one raw field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    File(Attachment),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Decode a raw JSON value into its tagged shape
    pub fn decode(raw: &Value) -> Self {
        match raw {
            Value::Null => FieldValue::Empty,
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Empty),
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Array(items) => {
                FieldValue::List(items.iter().map(FieldValue::decode).collect())
            }
            Value::Object(map) => match map.get("url").and_then(Value::as_str) {
                Some(url) => FieldValue::File(Attachment {
                    filename: map
                        .get("filename")
                        .and_then(Value::as_str)
                        .unwrap_or("Download")
                        .to_string(),
                    url: url.to_string(),
                }),
                // An object without a url has no mentor-facing rendering
                None => FieldValue::Empty,
            },
        }
    }

    /// Decode the named field of a raw field map
    pub fn of(fields: &serde_json::Map<String, Value>, name: &str) -> Self {
        fields.get(name).map(FieldValue::decode).unwrap_or(FieldValue::Empty)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Scalar text rendering: numbers display without a trailing `.0`,
    /// anything non-scalar falls back to the default
    fn scalar_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(format!("{}", n)),
            FieldValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Plain text for display fields; lists are NOT unwrapped here
    pub fn text(&self, default: &str) -> String {
        self.scalar_text().unwrap_or_else(|| default.to_string())
    }

    /// Lookup-style text: a list unwraps to its first element (or the
    /// default when empty), and stray bracket/quote characters left by
    /// stringified list artifacts are stripped
    pub fn unwrapped_text(&self, default: &str) -> String {
        let value = match self {
            FieldValue::List(items) => items
                .first()
                .and_then(FieldValue::scalar_text)
                .unwrap_or_else(|| default.to_string()),
            other => other.scalar_text().unwrap_or_else(|| default.to_string()),
        };
        value
            .trim_matches(|c| matches!(c, '[' | ']' | '\'' | '"'))
            .to_string()
    }

    /// Numeric reading; lists unwrap to their first element, numeric
    /// strings parse leniently
    pub fn number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().trim_start_matches('$').parse().ok(),
            FieldValue::List(items) => items.first().and_then(FieldValue::number),
            _ => None,
        }
    }

    /// All text entries of a field that may be scalar or list-shaped
    pub fn text_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => {
                items.iter().filter_map(FieldValue::scalar_text).collect()
            }
            other => other.scalar_text().map(|s| vec![s]).unwrap_or_default(),
        }
    }

    /// Attachment objects of a file field; non-file entries are skipped
    pub fn attachments(&self) -> Vec<Attachment> {
        match self {
            FieldValue::File(att) => vec![att.clone()],
            FieldValue::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    FieldValue::File(att) => Some(att.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Entries of a submission file list: attachment objects pass through,
    /// non-file entries are carried as opaque literals
    pub fn submission_files(&self) -> Vec<SubmissionFile> {
        let items = match self {
            FieldValue::List(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        items
            .iter()
            .filter_map(|item| match item {
                FieldValue::File(att) => Some(SubmissionFile::File(att.clone())),
                FieldValue::Empty => None,
                other => other.scalar_text().map(SubmissionFile::Literal),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(FieldValue::decode(&json!("hi")), FieldValue::Text("hi".into()));
        assert_eq!(FieldValue::decode(&json!(3)), FieldValue::Number(3.0));
        assert_eq!(FieldValue::decode(&json!(null)), FieldValue::Empty);
    }

    #[test]
    fn test_lookup_list_unwraps_to_first() {
        let value = FieldValue::decode(&json!(["pm@example.org", "other@example.org"]));
        assert_eq!(value.unwrapped_text(""), "pm@example.org");

        let empty = FieldValue::decode(&json!([]));
        assert_eq!(empty.unwrapped_text("fallback"), "fallback");
    }

    #[test]
    fn test_stray_bracket_quote_stripping() {
        let value = FieldValue::Text("['2026-03-01']".to_string());
        assert_eq!(value.unwrapped_text(""), "2026-03-01");
    }

    #[test]
    fn test_number_from_list_and_text() {
        assert_eq!(FieldValue::decode(&json!([4])).number(), Some(4.0));
        assert_eq!(FieldValue::Text("$52.5".into()).number(), Some(52.5));
        assert_eq!(FieldValue::Text("n/a".into()).number(), None);
    }

    #[test]
    fn test_attachment_decode() {
        let value = FieldValue::decode(&json!([
            { "filename": "paper.pdf", "url": "https://files.example/p.pdf" },
            { "id": "attX" },
            "inline note"
        ]));

        let atts = value.attachments();
        assert_eq!(atts.len(), 1);
        assert_eq!(atts[0].filename, "paper.pdf");

        let files = value.submission_files();
        assert_eq!(files.len(), 2);
        assert!(matches!(&files[1], SubmissionFile::Literal(s) if s == "inline note"));
    }

    #[test]
    fn test_attachment_without_filename_defaults() {
        let value = FieldValue::decode(&json!({ "url": "https://files.example/x" }));
        assert_eq!(value.attachments()[0].filename, "Download");
    }
}
