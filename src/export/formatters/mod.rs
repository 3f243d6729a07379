//! Position-aware formatters for export operations
//!
//! A formatter turns one document plus its stream [`Position`] into an output
//! fragment. Framing (array brackets, header rows) is emitted only for the
//! positions that open or close the stream, so concatenating fragments in
//! order yields a complete document.

use async_trait::async_trait;

use crate::error::Result;

use super::Document;
use super::position::Position;

pub mod csv;
pub mod json;

pub use csv::{CsvFormatter, NicknameCsvFormatter};
pub use json::JsonArrayFormatter;

/// Already-encoded output bytes, written verbatim
pub type Fragment = Vec<u8>;

/// Maps a positioned document to an output fragment
#[async_trait]
pub trait Formatter: Send + Sync {
    /// Encode `doc` for its place in the stream
    async fn format(&self, position: Position, doc: &Document) -> Result<Fragment>;
}

/// Look up a dotted field path such as `seller.id` in a nested document
///
/// Numeric segments index into arrays. Any missing segment yields `None`.
pub fn lookup_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Document> {
    path.split('.').try_fold(doc, |current, segment| match current {
        Document::Object(map) => map.get(segment),
        Document::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
