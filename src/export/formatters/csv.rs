//! CSV formatters
//!
//! Every item becomes exactly one row built from a fixed, ordered column list.
//! The header row is prepended to the row of the item that opens the stream.
//!
//! Numbers and booleans are written bare; everything else is wrapped in double
//! quotes. Embedded quotes are not escaped, so values containing `"` produce
//! rows that strict CSV readers will reject.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::export::Document;
use crate::export::lookup::UserLookup;
use crate::export::position::Position;

use super::{Formatter, Fragment, lookup_path};

/// Formatter for a fixed column set
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Dotted field paths, in output order
    columns: Vec<String>,
    /// Pre-rendered header row including the trailing newline
    header: String,
}

impl CsvFormatter {
    /// Create a formatter whose header is the column paths themselves
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let header = format!("{}\n", columns.join(","));
        Self { columns, header }
    }

    /// Column paths in output order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Header row, newline terminated
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Render the cells of one document, without the trailing newline
    fn cells(&self, doc: &Document) -> Vec<String> {
        self.columns
            .iter()
            .map(|path| render_value(lookup_path(doc, path)))
            .collect()
    }

    fn assemble(&self, position: Position, cells: &[String]) -> Fragment {
        let mut line = String::new();
        if position.opens() {
            line.push_str(&self.header);
        }
        line.push_str(&cells.join(","));
        line.push('\n');
        line.into_bytes()
    }
}

#[async_trait]
impl Formatter for CsvFormatter {
    async fn format(&self, position: Position, doc: &Document) -> Result<Fragment> {
        Ok(self.assemble(position, &self.cells(doc)))
    }
}

/// CSV formatter with one extra column resolved through a [`UserLookup`]
///
/// The id at `id_path` is looked up and `field` is read from the returned
/// document. A missing id, an unknown user or a failed lookup all render as an
/// empty value.
pub struct NicknameCsvFormatter {
    base: CsvFormatter,
    id_path: String,
    field: String,
    lookup: Arc<dyn UserLookup>,
}

impl NicknameCsvFormatter {
    /// # Arguments
    /// * `columns` - Regular columns
    /// * `extra_header` - Header name of the resolved column
    /// * `id_path` - Field path holding the user id
    /// * `field` - Field to read from the looked-up user document
    /// * `lookup` - Lookup collaborator
    pub fn new<I, S>(
        columns: I,
        extra_header: &str,
        id_path: &str,
        field: &str,
        lookup: Arc<dyn UserLookup>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut base = CsvFormatter::new(columns);
        base.header = format!("{},{}\n", base.columns.join(","), extra_header);

        Self {
            base,
            id_path: id_path.to_string(),
            field: field.to_string(),
            lookup,
        }
    }

    /// Header row, newline terminated
    pub fn header(&self) -> &str {
        &self.base.header
    }

    async fn resolve(&self, doc: &Document) -> Option<Document> {
        let id = lookup_path(doc, &self.id_path).filter(|id| !id.is_null())?;

        match self.lookup.lookup(id).await {
            Ok(Some(user)) => lookup_path(&user, &self.field).cloned(),
            Ok(None) => {
                debug!("No user found for {} = {}", self.id_path, id);
                None
            }
            Err(e) => {
                warn!("{} for {} = {}, leaving column empty", e, self.id_path, id);
                None
            }
        }
    }
}

#[async_trait]
impl Formatter for NicknameCsvFormatter {
    async fn format(&self, position: Position, doc: &Document) -> Result<Fragment> {
        let mut cells = self.base.cells(doc);
        let resolved = self.resolve(doc).await;
        cells.push(render_value(resolved.as_ref()));
        Ok(self.base.assemble(position, &cells))
    }
}

/// Render one cell value
fn render_value(value: Option<&Document>) -> String {
    match value {
        Some(Document::Number(n)) => n.to_string(),
        Some(Document::Bool(b)) => b.to_string(),
        Some(Document::String(s)) => format!("\"{}\"", s),
        Some(Document::Null) | None => "\"\"".to_string(),
        Some(other) => format!("\"{}\"", other),
    }
}
