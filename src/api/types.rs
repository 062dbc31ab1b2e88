//! JIRA REST wire types.
//!
//! Only the shapes that are decoded wholesale live here. Issue documents are
//! mapped field by field in [`crate::issue`], because every field there may be absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Search response from `GET search`.
///
/// Only the first page is read; paging fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    pub issues: Vec<Value>,
}

/// Response from `GET issue/{id}/worklog`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorklogResponse {
    #[serde(default)]
    pub worklogs: Vec<WorklogEntry>,
}

/// One raw work log entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogEntry {
    #[serde(default)]
    pub author: Option<UserRef>,
    pub started: String,
    #[serde(default)]
    pub time_spent_seconds: u64,
    /// Plain text on REST v2, an ADF document on v3.
    #[serde(default)]
    pub comment: Option<Value>,
}

/// A user reference as embedded in issues and work logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserRef {
    /// The login name, falling back to the display name (v3 has no `name`).
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().or(self.display_name.as_deref())
    }
}

/// Aggregate progress of an issue and its sub-tasks, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub progress: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

/// Render a rich-text field as plain text.
///
/// Strings pass through; ADF documents are flattened; anything else is `None`.
pub fn rich_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("doc") => {
            serde_json::from_value::<AtlassianDoc>(value.clone())
                .ok()
                .map(|doc| doc.to_plain_text())
        }
        _ => None,
    }
}

/// Atlassian Document Format (ADF) content.
///
/// REST v3 returns ADF for descriptions and work log comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlassianDoc {
    /// The document type (always "doc" for root documents).
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub content: Vec<Value>,
}

impl AtlassianDoc {
    /// Convert ADF content to plain text.
    ///
    /// Recursively extracts text nodes, keeping paragraphs and line breaks.
    pub fn to_plain_text(&self) -> String {
        let mut result = String::new();
        for node in &self.content {
            extract_text(node, &mut result);
        }
        result.trim().to_string()
    }
}

fn extract_children(obj: &Map<String, Value>, result: &mut String) {
    if let Some(Value::Array(items)) = obj.get("content") {
        for item in items {
            extract_text(item, result);
        }
    }
}

fn extract_text(node: &Value, result: &mut String) {
    let obj = match node {
        Value::Object(obj) => obj,
        Value::Array(items) => {
            for item in items {
                extract_text(item, result);
            }
            return;
        }
        _ => return,
    };

    match obj.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = obj.get("text").and_then(Value::as_str) {
                result.push_str(text);
            }
        }
        Some("paragraph") | Some("heading") | Some("codeBlock") => {
            extract_children(obj, result);
            if !result.is_empty() && !result.ends_with('\n') {
                result.push('\n');
            }
        }
        Some("hardBreak") => result.push('\n'),
        Some("listItem") => {
            result.push_str("• ");
            extract_children(obj, result);
        }
        Some("blockquote") => {
            result.push_str("> ");
            extract_children(obj, result);
        }
        Some("mention") => {
            if let Some(text) = obj
                .get("attrs")
                .and_then(|a| a.get("text"))
                .and_then(Value::as_str)
            {
                result.push('@');
                result.push_str(text.trim_start_matches('@'));
            }
        }
        Some("emoji") => {
            if let Some(shortname) = obj
                .get("attrs")
                .and_then(|a| a.get("shortName"))
                .and_then(Value::as_str)
            {
                result.push_str(shortname);
            }
        }
        // No useful text representation.
        Some("inlineCard") | Some("mediaGroup") | Some("mediaSingle") => {}
        _ => extract_children(obj, result),
    }
}
