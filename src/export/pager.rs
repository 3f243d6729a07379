//! Page source abstraction and the offset/limit pager
//!
//! A [`PageSource`] answers one windowed query at a time. The [`Pager`] turns
//! repeated fetches into a page sequence tagged with [`PagePosition`], without
//! ever holding more than one page.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ExportError, Result};

use super::Document;
use super::position::PagePosition;

/// One fetched window of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Total number of items the source reported at fetch time
    pub total: u64,
    /// Offset that was requested
    pub offset: u64,
    /// Limit that was requested
    pub limit: u64,
    /// Items in the window, in source order
    pub items: Vec<Document>,
}

/// Source of paginated results
///
/// Implementations own transport, authentication and timeouts. A fetch that
/// fails must return an error rather than an empty page.
#[async_trait]
pub trait PageSource: Send {
    /// Fetch the window `[offset, offset + limit)`
    async fn fetch(&mut self, offset: u64, limit: u64) -> Result<Page>;
}

/// Cursor over a [`PageSource`]
///
/// Owned by a single export. After a terminal page ([`PagePosition::Last`] or
/// [`PagePosition::FirstAndLast`]) callers must stop polling.
pub struct Pager<S> {
    source: S,
    offset: u64,
    limit: u64,
    /// Total reported by the most recent fetch
    total_seen: Option<u64>,
    fetched_any: bool,
    pages_fetched: u64,
}

impl<S: PageSource> Pager<S> {
    /// Create a pager whose first fetch uses `offset`/`limit`
    pub fn new(source: S, offset: u64, limit: u64) -> Self {
        Self {
            source,
            offset,
            limit,
            total_seen: None,
            fetched_any: false,
            pages_fetched: 0,
        }
    }

    /// Fetch the next page and classify it
    ///
    /// Fails with [`ExportError::ResultsNotFound`] when any fetch comes back
    /// empty, including fetches after the first page.
    pub async fn next(&mut self) -> Result<(PagePosition, Vec<Document>)> {
        let page = self.source.fetch(self.offset, self.limit).await?;
        let count = page.items.len() as u64;

        if count == 0 {
            debug!(
                "Empty page at offset {} (total reported: {})",
                self.offset, page.total
            );
            return Err(ExportError::ResultsNotFound {
                offset: self.offset,
                limit: self.limit,
            }
            .into());
        }

        if count > self.limit {
            warn!(
                "Page source returned {} items for limit {}",
                count, self.limit
            );
        }

        if let Some(previous) = self.total_seen {
            if previous != page.total {
                warn!("Reported total changed from {} to {}", previous, page.total);
            }
        }

        let is_first = !self.fetched_any;
        let is_last = self.offset + count >= page.total;
        let position = PagePosition::classify(is_first, is_last);

        self.fetched_any = true;
        self.total_seen = Some(page.total);
        self.pages_fetched += 1;

        debug!(
            "Fetched page #{} at offset {}: {} items of {} ({:?})",
            self.pages_fetched, self.offset, count, page.total, position
        );

        if !position.is_terminal() {
            self.offset += count;
        }

        Ok((position, page.items))
    }

    /// Total reported by the most recent fetch
    pub fn total_seen(&self) -> Option<u64> {
        self.total_seen
    }

    /// Number of successful fetches so far
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::position::remap_page;
    use crate::source::MemoryPageSource;
    use serde_json::json;

    fn docs(n: usize) -> Vec<Document> {
        (0..n).map(|i| json!({ "id": i })).collect()
    }

    #[tokio::test]
    async fn test_single_page_is_first_and_last() {
        let mut pager = Pager::new(MemoryPageSource::new(docs(1)), 0, 50);
        let (position, items) = pager.next().await.unwrap();
        assert_eq!(position, PagePosition::FirstAndLast);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_three_pages() {
        let mut pager = Pager::new(MemoryPageSource::new(docs(120)), 0, 50);

        let (p1, i1) = pager.next().await.unwrap();
        assert_eq!((p1, i1.len()), (PagePosition::First, 50));
        let (p2, i2) = pager.next().await.unwrap();
        assert_eq!((p2, i2.len()), (PagePosition::Middle, 50));
        let (p3, i3) = pager.next().await.unwrap();
        assert_eq!((p3, i3.len()), (PagePosition::Last, 20));

        assert_eq!(pager.pages_fetched(), 3);
        assert_eq!(pager.total_seen(), Some(120));
        assert_eq!(i3[19]["id"], json!(119));
    }

    #[tokio::test]
    async fn test_exact_multiple_of_limit() {
        let mut pager = Pager::new(MemoryPageSource::new(docs(100)), 0, 50);
        assert_eq!(pager.next().await.unwrap().0, PagePosition::First);
        assert_eq!(pager.next().await.unwrap().0, PagePosition::Last);
    }

    #[tokio::test]
    async fn test_initial_offset() {
        let mut pager = Pager::new(MemoryPageSource::new(docs(30)), 25, 10);
        let (position, items) = pager.next().await.unwrap();
        assert_eq!(position, PagePosition::FirstAndLast);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0]["id"], json!(25));
    }

    #[tokio::test]
    async fn test_every_window_opens_and_closes_once() {
        for total in 1..=9usize {
            for offset in 0..total as u64 {
                for limit in 1..=4u64 {
                    let mut pager = Pager::new(MemoryPageSource::new(docs(total)), offset, limit);
                    let mut stream = Vec::new();
                    let mut ids = Vec::new();
                    loop {
                        let (page, items) = pager.next().await.unwrap();
                        stream.extend(remap_page(page, items.len()));
                        ids.extend(items.iter().map(|item| item["id"].clone()));
                        if page.is_terminal() {
                            break;
                        }
                    }

                    let case = format!("total={total} offset={offset} limit={limit}");
                    let expected = total - offset as usize;
                    assert_eq!(stream.len(), expected, "{case}");
                    assert_eq!(stream.iter().filter(|p| p.opens()).count(), 1, "{case}");
                    assert_eq!(stream.iter().filter(|p| p.closes()).count(), 1, "{case}");
                    assert!(stream[0].opens(), "{case}");
                    assert!(stream[expected - 1].closes(), "{case}");
                    let in_order: Vec<_> = (offset as usize..total).map(|i| json!(i)).collect();
                    assert_eq!(ids, in_order, "{case}");
                }
            }
        }
    }

    #[tokio::test]
    async fn test_empty_first_fetch() {
        let mut pager = Pager::new(MemoryPageSource::new(Vec::new()), 0, 50);
        let err = pager.next().await.unwrap_err();
        assert!(matches!(
            err.as_export(),
            Some(ExportError::ResultsNotFound { offset: 0, limit: 50 })
        ));
    }

    #[tokio::test]
    async fn test_offset_past_end() {
        let mut pager = Pager::new(MemoryPageSource::new(docs(10)), 10, 5);
        assert!(pager.next().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_page_after_first() {
        // Source claims 120 items but only ever has 50.
        let source = MemoryPageSource::new(docs(50)).with_reported_total(120);
        let mut pager = Pager::new(source, 0, 50);

        assert_eq!(pager.next().await.unwrap().0, PagePosition::First);
        let err = pager.next().await.unwrap_err();
        assert!(matches!(
            err.as_export(),
            Some(ExportError::ResultsNotFound { offset: 50, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let source = MemoryPageSource::new(docs(120)).failing_at(50);
        let mut pager = Pager::new(source, 0, 50);

        pager.next().await.unwrap();
        let err = pager.next().await.unwrap_err();
        assert!(matches!(err.as_export(), Some(ExportError::FetchFailed(_))));
    }
}
