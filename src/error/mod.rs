//! Error handling for export operations.
//!
//! Errors are split by concern:
//! - [`ExportError`]: failures of the paginated export pipeline itself
//! - [`ConfigError`]: problems loading or validating configuration
//! - [`LookupError`]: failures of the user lookup collaborator, which are
//!   recovered locally and never abort an export
//!
//! All of them convert into the top-level [`PagexportError`].

pub mod kinds;
pub mod mongo;

pub use kinds::{ConfigError, ExportError, LookupError, PagexportError, Result};
pub use mongo::describe_mongodb_error;
