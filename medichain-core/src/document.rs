use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Value;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
            embedding: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// `source` metadata entry, when it is a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }

    /// At most `max_chars` characters of the content, cut on a char boundary.
    pub fn truncated_content(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Document;

    #[test]
    fn truncated_content_respects_multibyte_chars() {
        let doc = Document::new("d1", "đau đầu kéo dài");
        assert_eq!(doc.truncated_content(7), "đau đầu");
        assert_eq!(doc.truncated_content(100), "đau đầu kéo dài");
        assert_eq!(doc.truncated_content(0), "");
    }
}
