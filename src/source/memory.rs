//! In-memory page source and user lookup
//!
//! Used for offline replays of exported JSON arrays and as test fixtures.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{ConfigError, ExportError, LookupError, Result};
use crate::export::{Document, Page, PageSource, UserLookup};

/// Page source serving windows over a fixed list of documents
#[derive(Debug, Clone)]
pub struct MemoryPageSource {
    items: Vec<Document>,
    /// Total to report instead of `items.len()`
    reported_total: Option<u64>,
    /// Fetches at or beyond this offset fail
    fail_at: Option<u64>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryPageSource {
    pub fn new(items: Vec<Document>) -> Self {
        Self {
            items,
            reported_total: None,
            fail_at: None,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Load a JSON array of documents, such as a previous JSON export
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        Ok(Self::new(read_json_array(path).await?))
    }

    /// Report `total` regardless of how many items are actually held
    pub fn with_reported_total(mut self, total: u64) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Fail every fetch whose offset is at or past `offset`
    pub fn failing_at(mut self, offset: u64) -> Self {
        self.fail_at = Some(offset);
        self
    }

    /// Shared counter of fetch calls, readable after the source is moved
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }
}

#[async_trait]
impl PageSource for MemoryPageSource {
    async fn fetch(&mut self, offset: u64, limit: u64) -> Result<Page> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.fail_at.is_some_and(|at| offset >= at) {
            let message = format!("simulated failure at offset {offset}");
            return Err(ExportError::FetchFailed(message).into());
        }

        let start = (offset as usize).min(self.items.len());
        let end = start.saturating_add(limit as usize).min(self.items.len());

        Ok(Page {
            total: self.reported_total.unwrap_or(self.items.len() as u64),
            offset,
            limit,
            items: self.items[start..end].to_vec(),
        })
    }
}

/// User lookup over a fixed set of user documents keyed by their `id`
#[derive(Debug, Clone, Default)]
pub struct MemoryUserLookup {
    users: HashMap<String, Document>,
}

impl MemoryUserLookup {
    pub fn new<I: IntoIterator<Item = Document>>(users: I) -> Self {
        let users = users
            .into_iter()
            .filter_map(|user| {
                let key = user.get("id").map(key_of)?;
                Some((key, user))
            })
            .collect();
        Self { users }
    }
}

impl MemoryUserLookup {
    /// Load users from a JSON array file
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        Ok(Self::new(read_json_array(path).await?))
    }
}

#[async_trait]
impl UserLookup for MemoryUserLookup {
    async fn lookup(&self, id: &Document) -> std::result::Result<Option<Document>, LookupError> {
        Ok(self.users.get(&key_of(id)).cloned())
    }
}

async fn read_json_array(path: &Path) -> Result<Vec<Document>> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    let items = serde_json::from_slice(&content).map_err(|e| {
        ConfigError::InvalidFormat(format!("{} is not a JSON array: {}", path.display(), e))
    })?;
    Ok(items)
}

/// Keys by JSON text so `"7"` and `7` stay distinct ids
fn key_of(id: &Document) -> String {
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_windows() {
        let mut source = MemoryPageSource::new((0..5).map(|i| json!(i)).collect());
        let page = source.fetch(3, 10).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items, vec![json!(3), json!(4)]);

        let past_end = source.fetch(9, 10).await.unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(source.fetch_counter().load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        tokio::fs::write(&path, "[\n{\"id\":1},\n{\"id\":2}\n]\n").await.unwrap();

        let mut source = MemoryPageSource::from_json_file(&path).await.unwrap();
        assert_eq!(source.fetch(0, 50).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let lookup = MemoryUserLookup::new([
            json!({ "id": 7, "nickname": "ACME" }),
            json!({ "nickname": "no id" }),
        ]);
        assert_eq!(
            lookup.lookup(&json!(7)).await.unwrap(),
            Some(json!({ "id": 7, "nickname": "ACME" }))
        );
        assert_eq!(lookup.lookup(&json!(8)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_lookup_keeps_id_types_apart() {
        let lookup = MemoryUserLookup::new([
            json!({ "id": "7", "nickname": "TEXT" }),
            json!({ "id": 8, "nickname": "NUMBER" }),
        ]);
        assert_eq!(lookup.lookup(&json!(7)).await.unwrap(), None);
        assert_eq!(lookup.lookup(&json!("8")).await.unwrap(), None);
        assert_eq!(
            lookup.lookup(&json!("7")).await.unwrap(),
            Some(json!({ "id": "7", "nickname": "TEXT" }))
        );
        assert_eq!(
            lookup.lookup(&json!(8)).await.unwrap(),
            Some(json!({ "id": 8, "nickname": "NUMBER" }))
        );
    }
}
