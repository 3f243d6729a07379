//! pagexport library
//!
//! Streams multi-page query results to a file or stream in JSON or CSV
//! without materializing the full result set.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Pager, position remapping, formatters, sink and coordinator
//! - `exporter`: Entry points per paging scheme
//! - `source`: MongoDB and in-memory page sources and user lookups

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod exporter;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use error::{PagexportError, Result};
pub use export::{ExportCoordinator, ExportOptions, ExportResult, OutputFormat, PagingScheme};
pub use exporter::{Exporter, run_export};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
