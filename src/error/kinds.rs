use std::{fmt, io};

use crate::error::mongo::describe_mongodb_error;

/// Crate-wide `Result` type using [`PagexportError`] as the error.
pub type Result<T> = std::result::Result<T, PagexportError>;

/// Top-level error type for pagexport.
#[derive(Debug)]
pub enum PagexportError {
    /// Export pipeline errors.
    Export(ExportError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors outside the sink (config files, metadata).
    Io(io::Error),

    /// MongoDB driver errors raised while connecting.
    MongoDb(mongodb::error::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors raised by the pager, the formatters and the sink.
#[derive(Debug)]
pub enum ExportError {
    /// The page source failed to produce a page.
    FetchFailed(String),

    /// A fetch returned zero items where at least one was expected.
    ResultsNotFound { offset: u64, limit: u64 },

    /// The sink rejected a write, flush or close.
    WriteFailed(String),

    /// A document could not be encoded into an output fragment.
    Encode(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Failure of the id → document lookup used for the extra CSV column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The backing store failed.
    Backend(String),

    /// The identifier could not be used as a lookup key.
    InvalidId(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for PagexportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagexportError::Export(e) => write!(f, "Export error: {e}"),
            PagexportError::Config(e) => write!(f, "Configuration error: {e}"),
            PagexportError::Io(e) => write!(f, "I/O error: {e}"),
            PagexportError::MongoDb(e) => write!(f, "MongoDB error: {}", describe_mongodb_error(e)),
            PagexportError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::FetchFailed(msg) => write!(f, "Failed to fetch page: {msg}"),
            ExportError::ResultsNotFound { offset, limit } => {
                write!(f, "Results not found (offset {offset}, limit {limit})")
            }
            ExportError::WriteFailed(msg) => write!(f, "Failed to write output: {msg}"),
            ExportError::Encode(msg) => write!(f, "Failed to encode document: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not readable: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Backend(msg) => write!(f, "Lookup failed: {msg}"),
            LookupError::InvalidId(id) => write!(f, "Invalid lookup id: {id}"),
        }
    }
}

impl std::error::Error for PagexportError {}
impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for LookupError {}

/* ========================= Conversions to PagexportError ========================= */

impl From<io::Error> for PagexportError {
    fn from(err: io::Error) -> Self {
        PagexportError::Io(err)
    }
}

impl From<mongodb::error::Error> for PagexportError {
    fn from(err: mongodb::error::Error) -> Self {
        PagexportError::MongoDb(err)
    }
}

impl From<ExportError> for PagexportError {
    fn from(err: ExportError) -> Self {
        PagexportError::Export(err)
    }
}

impl From<ConfigError> for PagexportError {
    fn from(err: ConfigError) -> Self {
        PagexportError::Config(err)
    }
}

impl From<String> for PagexportError {
    fn from(msg: String) -> Self {
        PagexportError::Generic(msg)
    }
}

impl From<&str> for PagexportError {
    fn from(msg: &str) -> Self {
        PagexportError::Generic(msg.to_string())
    }
}

impl PagexportError {
    /// Returns the export error kind, if this is a pipeline failure.
    pub fn as_export(&self) -> Option<&ExportError> {
        match self {
            PagexportError::Export(e) => Some(e),
            _ => None,
        }
    }
}
