//! Export options resolved once per export

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default first offset
pub const DEFAULT_OFFSET: u64 = 0;

/// Default page size
pub const DEFAULT_LIMIT: u64 = 50;

/// Output encoding
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A single JSON array, one compact document per line
    #[default]
    Json,
    /// Header row followed by one row per document
    Csv,
}

impl OutputFormat {
    /// File extension used for generated file names
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{other}' (expected json or csv)")),
        }
    }
}

/// Immutable configuration for one export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Output encoding
    pub format: OutputFormat,
    /// Add the resolved nickname column (CSV only)
    pub include_extra_column: bool,
    /// Offset of the first fetch
    pub offset: u64,
    /// Page size for every fetch
    pub limit: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            include_extra_column: false,
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ExportOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_extra_column(mut self, include: bool) -> Self {
        self.include_extra_column = include;
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Reject options no page source can honour
    ///
    /// A zero limit never makes progress, and MongoDB reads it as "no limit".
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.limit".to_string(),
                value: self.limit.to_string(),
            });
        }
        Ok(())
    }
}
