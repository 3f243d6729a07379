//! JSON array formatter
//!
//! Items are written compactly, one per line, separated by `,\n` and wrapped
//! in `[\n` / `\n]\n`.

use async_trait::async_trait;

use crate::error::{ExportError, Result};
use crate::export::Document;
use crate::export::position::Position;

use super::{Formatter, Fragment};

/// Formatter producing a single top-level JSON array
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonArrayFormatter;

impl JsonArrayFormatter {
    pub fn new() -> Self {
        Self
    }

    fn encode(doc: &Document) -> Result<Vec<u8>> {
        serde_json::to_vec(doc).map_err(|e| ExportError::Encode(e.to_string()).into())
    }
}

#[async_trait]
impl Formatter for JsonArrayFormatter {
    async fn format(&self, position: Position, doc: &Document) -> Result<Fragment> {
        let body = Self::encode(doc)?;
        let mut fragment = Vec::with_capacity(body.len() + 5);

        if position.opens() {
            fragment.extend_from_slice(b"[\n");
        }
        fragment.extend_from_slice(&body);
        if position.closes() {
            fragment.extend_from_slice(b"\n]\n");
        } else {
            fragment.extend_from_slice(b",\n");
        }

        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn render(position: Position) -> String {
        let fragment = JsonArrayFormatter::new()
            .format(position, &json!({ "id": 1 }))
            .await
            .unwrap();
        String::from_utf8(fragment).unwrap()
    }

    #[tokio::test]
    async fn test_fragments_per_position() {
        assert_eq!(render(Position::First).await, "[\n{\"id\":1},\n");
        assert_eq!(render(Position::Middle).await, "{\"id\":1},\n");
        assert_eq!(render(Position::Last).await, "{\"id\":1}\n]\n");
        assert_eq!(render(Position::FirstAndLast).await, "[\n{\"id\":1}\n]\n");
    }

    #[tokio::test]
    async fn test_concatenation_parses() {
        let formatter = JsonArrayFormatter::new();
        let docs = vec![json!({ "a": 1 }), json!({ "b": [1, 2] }), json!({ "c": null })];
        let positions = [Position::First, Position::Middle, Position::Last];

        let mut out = Vec::new();
        for (doc, position) in docs.iter().zip(positions) {
            out.extend(formatter.format(position, doc).await.unwrap());
        }

        let parsed: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, docs);
    }
}
