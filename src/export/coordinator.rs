//! Export coordinator
//!
//! Drives pager → position remapping → formatter → sink in one sequential
//! loop. Memory use is bounded by a single page.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;

use super::formatters::Formatter;
use super::pager::{PageSource, Pager};
use super::position::remap_page;
use super::progress::ProgressTracker;
use super::sink::SinkWriter;

/// Result of an export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of documents written
    pub documents_exported: u64,
    /// Number of pages fetched
    pub pages_fetched: u64,
    /// Bytes written to the sink
    pub bytes_written: u64,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Coordinator for one export
pub struct ExportCoordinator<S> {
    pager: Pager<S>,
    formatter: Box<dyn Formatter>,
    sink: SinkWriter,
    tracker: ProgressTracker,
}

impl<S: PageSource> ExportCoordinator<S> {
    pub fn new(pager: Pager<S>, formatter: Box<dyn Formatter>, sink: SinkWriter) -> Self {
        Self {
            pager,
            formatter,
            sink,
            tracker: ProgressTracker::hidden(),
        }
    }

    /// Report progress through `tracker`
    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Run the export to completion
    ///
    /// The sink is closed exactly once whether the loop succeeds or fails. If
    /// the loop failed, its error is returned even when closing fails too.
    pub async fn execute(mut self) -> Result<ExportResult> {
        let start_time = Instant::now();
        info!("Starting export to {}", self.sink.target());

        let outcome = self.run().await;
        let closed = self.sink.close().await;
        self.tracker.finish();

        let exported = match (outcome, closed) {
            (Ok(exported), Ok(())) => exported,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!("Failed to close sink after error: {}", close_err);
                }
                warn!(
                    "Export aborted after {} documents: {}",
                    self.tracker.processed(),
                    e
                );
                return Err(e);
            }
        };

        let result = ExportResult {
            documents_exported: exported,
            pages_fetched: self.pager.pages_fetched(),
            bytes_written: self.sink.bytes_written(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Export completed: {} documents, {} pages, {} bytes, {} ms",
            result.documents_exported, result.pages_fetched, result.bytes_written, result.elapsed_ms
        );

        Ok(result)
    }

    async fn run(&mut self) -> Result<u64> {
        let mut exported = 0u64;

        loop {
            let (page_position, items) = self.pager.next().await?;
            debug!("Writing {} documents ({:?})", items.len(), page_position);

            if let Some(total) = self.pager.total_seen() {
                self.tracker.set_total(total);
            }

            let positions = remap_page(page_position, items.len());
            for (doc, position) in items.iter().zip(positions) {
                let fragment = self.formatter.format(position, doc).await?;
                self.sink.write(&fragment).await?;
                exported += 1;
            }
            self.sink.flush().await?;
            self.tracker.update(exported);

            if page_position.is_terminal() {
                return Ok(exported);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::export::formatters::{CsvFormatter, JsonArrayFormatter};
    use crate::source::MemoryPageSource;
    use serde_json::{Value, json};
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tokio::io::AsyncWrite;

    fn docs(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({ "id": i, "title": format!("item {i}"), "price": i as f64 + 0.5 }))
            .collect()
    }

    /// Writer that records how often it was shut down and can fail writes
    #[derive(Clone, Default)]
    struct ProbeWriter {
        shutdowns: Arc<AtomicUsize>,
        fail_writes: bool,
    }

    impl AsyncWrite for ProbeWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.fail_writes {
                Poll::Ready(Err(io::Error::other("disk full")))
            } else {
                Poll::Ready(Ok(buf.len()))
            }
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Poll::Ready(Ok(()))
        }
    }

    async fn export_to_string(source: MemoryPageSource, limit: u64, csv: bool) -> Result<String> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let formatter: Box<dyn Formatter> = if csv {
            Box::new(CsvFormatter::new(["id", "title", "price"]))
        } else {
            Box::new(JsonArrayFormatter::new())
        };

        let sink = SinkWriter::create(&path).await?;
        ExportCoordinator::new(Pager::new(source, 0, limit), formatter, sink)
            .execute()
            .await?;
        Ok(tokio::fs::read_to_string(&path).await.unwrap())
    }

    #[tokio::test]
    async fn test_json_round_trip_various_lengths() {
        for n in [1, 2, 3, 49, 50, 51, 120] {
            let out = export_to_string(MemoryPageSource::new(docs(n)), 50, false)
                .await
                .unwrap();
            let parsed: Vec<Value> = serde_json::from_str(&out).unwrap();
            assert_eq!(parsed, docs(n), "n={n}");
            assert!(out.starts_with("[\n") && out.ends_with("\n]\n"));
        }
    }

    #[tokio::test]
    async fn test_csv_has_one_header_and_all_rows() {
        let out = export_to_string(MemoryPageSource::new(docs(120)), 50, true)
            .await
            .unwrap();
        let lines: Vec<&str> = out.split_terminator('\n').collect();

        assert_eq!(lines.len(), 121);
        assert_eq!(lines[0], "id,title,price");
        assert_eq!(lines.iter().filter(|l| **l == "id,title,price").count(), 1);
        assert_eq!(lines[1], "0,\"item 0\",0.5");
        assert!(!out.contains("\n\n"));
    }

    #[tokio::test]
    async fn test_empty_source_is_an_error() {
        let err = export_to_string(MemoryPageSource::new(Vec::new()), 50, false)
            .await
            .unwrap_err();
        assert!(matches!(err.as_export(), Some(ExportError::ResultsNotFound { .. })));
    }

    #[tokio::test]
    async fn test_result_counts() {
        let probe = ProbeWriter::default();
        let sink = SinkWriter::from_writer(probe.clone(), "probe");
        let pager = Pager::new(MemoryPageSource::new(docs(120)), 0, 50);

        let result = ExportCoordinator::new(pager, Box::new(JsonArrayFormatter::new()), sink)
            .execute()
            .await
            .unwrap();

        assert_eq!(result.documents_exported, 120);
        assert_eq!(result.pages_fetched, 3);
        assert!(result.bytes_written > 0);
        assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sink_closed_once_on_fetch_failure() {
        let probe = ProbeWriter::default();
        let sink = SinkWriter::from_writer(probe.clone(), "probe");
        let source = MemoryPageSource::new(docs(120)).failing_at(50);

        let err = ExportCoordinator::new(
            Pager::new(source, 0, 50),
            Box::new(JsonArrayFormatter::new()),
            sink,
        )
        .execute()
        .await
        .unwrap_err();

        assert!(matches!(err.as_export(), Some(ExportError::FetchFailed(_))));
        assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_writes_after_empty_second_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        let source = MemoryPageSource::new(docs(50)).with_reported_total(120);
        let calls = source.fetch_counter();

        let sink = SinkWriter::create(&path).await.unwrap();
        let err = ExportCoordinator::new(
            Pager::new(source, 0, 50),
            Box::new(JsonArrayFormatter::new()),
            sink,
        )
        .execute()
        .await
        .unwrap_err();

        assert!(matches!(err.as_export(), Some(ExportError::ResultsNotFound { offset: 50, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Only the first page made it out; the array is never closed.
        let out = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(out.lines().count(), 51);
        assert!(!out.ends_with("]\n"));
    }

    #[tokio::test]
    async fn test_write_failure_stops_fetching() {
        let probe = ProbeWriter {
            fail_writes: true,
            ..ProbeWriter::default()
        };
        let sink = SinkWriter::from_writer(probe.clone(), "probe");
        let source = MemoryPageSource::new(docs(120));
        let calls = source.fetch_counter();

        let err = ExportCoordinator::new(
            Pager::new(source, 0, 50),
            Box::new(JsonArrayFormatter::new()),
            sink,
        )
        .execute()
        .await
        .unwrap_err();

        assert!(matches!(err.as_export(), Some(ExportError::WriteFailed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
