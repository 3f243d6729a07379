//! Output sink for export operations
//!
//! The sink wraps a file or stdout behind a buffered writer. Fragments are
//! written in order; [`SinkWriter::flush`] is called by the coordinator after
//! every page so output becomes visible progressively and write failures
//! surface before the next fetch.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::{ExportError, Result};

/// Buffer size for file and stream sinks
const SINK_BUFFER_SIZE: usize = 1024 * 1024;

type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Scoped output resource
pub struct SinkWriter {
    writer: BufWriter<BoxedWrite>,
    /// Human-readable destination for logs and messages
    target: String,
    bytes_written: u64,
    closed: bool,
}

impl SinkWriter {
    /// Create (or truncate) the file at `path`
    pub async fn create(path: &Path) -> Result<Self> {
        validate_path(path)?;

        let file = File::create(path).await.map_err(|e| {
            ExportError::WriteFailed(format!("Failed to create {}: {}", path.display(), e))
        })?;

        debug!("Created sink for: {}", path.display());
        Ok(Self::from_writer(file, path.display().to_string()))
    }

    /// Sink writing to the process stdout
    pub fn stdout() -> Self {
        Self::from_writer(tokio::io::stdout(), "<stdout>")
    }

    /// Sink over any async writer
    pub fn from_writer<W>(writer: W, target: impl Into<String>) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let boxed: BoxedWrite = Box::new(writer);
        Self {
            writer: BufWriter::with_capacity(SINK_BUFFER_SIZE, boxed),
            target: target.into(),
            bytes_written: 0,
            closed: false,
        }
    }

    /// Write one fragment
    pub async fn write(&mut self, fragment: &[u8]) -> Result<()> {
        if self.closed {
            return Err(
                ExportError::WriteFailed(format!("{} is already closed", self.target)).into(),
            );
        }

        self.writer.write_all(fragment).await.map_err(|e| {
            ExportError::WriteFailed(format!("Failed to write to {}: {}", self.target, e))
        })?;
        self.bytes_written += fragment.len() as u64;
        Ok(())
    }

    /// Push buffered fragments to the destination
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(|e| {
            ExportError::WriteFailed(format!("Failed to flush {}: {}", self.target, e))
        })?;
        Ok(())
    }

    /// Flush and release the destination
    ///
    /// Only the first call does any work.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let flushed = self.writer.flush().await;
        let shutdown = self.writer.shutdown().await;

        flushed.and(shutdown).map_err(|e| {
            ExportError::WriteFailed(format!("Failed to close {}: {}", self.target, e))
        })?;

        debug!("Closed sink {} ({} bytes)", self.target, self.bytes_written);
        Ok(())
    }

    /// Bytes accepted so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for SinkWriter {
    fn drop(&mut self) {
        if !self.closed {
            debug!("SinkWriter for {} dropped without explicit close", self.target);
        }
    }
}

/// Destination for an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    File(PathBuf),
}

impl SinkTarget {
    /// `None` and `-` mean stdout
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(path) if path.as_os_str() != "-" => SinkTarget::File(path.to_path_buf()),
            _ => SinkTarget::Stdout,
        }
    }

    /// Open the destination
    pub async fn open(&self) -> Result<SinkWriter> {
        match self {
            SinkTarget::Stdout => Ok(SinkWriter::stdout()),
            SinkTarget::File(path) => SinkWriter::create(path).await,
        }
    }
}

/// Check that the parent directory of `path` exists
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ExportError::WriteFailed(format!(
                "Directory does not exist: {}",
                parent.display()
            ))
            .into());
        }
    }

    Ok(())
}
