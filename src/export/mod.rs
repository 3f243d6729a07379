//! Paginated streaming export
//!
//! Results are pulled from a [`PageSource`] one window at a time and written
//! straight to a [`SinkWriter`], so the full result set is never held in
//! memory.
//!
//! # Architecture
//!
//! 1. **Pager**: wraps a page source with an offset/limit cursor and tags each
//!    page as first, middle, last or both
//! 2. **Position remapping**: turns page tags into per-item stream positions
//! 3. **Formatter**: encodes a positioned item (JSON array or CSV rows)
//! 4. **SinkWriter**: writes fragments in order to a file or stdout
//!
//! These components are orchestrated by the **ExportCoordinator**.
//!
//! # Example
//!
//! ```no_run
//! use pagexport::export::{
//!     ExportCoordinator, ExportOptions, OutputFormat, Pager, PagingScheme, SinkWriter,
//! };
//! use pagexport::source::MemoryPageSource;
//!
//! # async fn run() -> pagexport::Result<()> {
//! let options = ExportOptions::new(OutputFormat::Csv);
//! let source = MemoryPageSource::new(vec![serde_json::json!({ "id": 1 })]);
//! let pager = Pager::new(source, options.offset, options.limit);
//! let formatter = PagingScheme::Search.formatter(&options, None);
//! let sink = SinkWriter::create("items.csv".as_ref()).await?;
//!
//! let result = ExportCoordinator::new(pager, formatter, sink).execute().await?;
//! println!("{} documents", result.documents_exported);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod formatters;
pub mod lookup;
pub mod options;
pub mod pager;
pub mod position;
pub mod progress;
pub mod scheme;
pub mod sink;

pub use coordinator::{ExportCoordinator, ExportResult};
pub use formatters::{CsvFormatter, Formatter, Fragment, JsonArrayFormatter, NicknameCsvFormatter};
pub use lookup::UserLookup;
pub use options::{ExportOptions, OutputFormat};
pub use pager::{Page, PageSource, Pager};
pub use position::{PagePosition, Position};
pub use progress::ProgressTracker;
pub use scheme::{OrderArgs, PagingScheme, SearchArgs};
pub use sink::{SinkTarget, SinkWriter};

/// Generic structured document flowing through the pipeline
pub type Document = serde_json::Value;
