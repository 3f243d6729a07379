//! Command-line interface for pagexport
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Applying argument overrides on top of the configuration

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::export::{ExportOptions, OrderArgs, OutputFormat, PagingScheme, SearchArgs, SinkTarget};

/// Stream paginated MongoDB results to CSV or JSON
#[derive(Parser, Debug)]
#[command(
    name = "pagexport",
    version,
    about = "Stream paginated query results to CSV or JSON",
    long_about = "Export search results or orders page by page to a CSV or JSON file
without holding the whole result set in memory."
)]
pub struct CliArgs {
    /// Output file (stdout when omitted or '-')
    #[arg(short = 'o', long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Output format (json, csv)
    #[arg(short = 'f', long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Add the resolved nickname column (csv only)
    #[arg(long, global = true)]
    pub extra_column: bool,

    /// Offset of the first page
    #[arg(long, value_name = "N", global = true)]
    pub offset: Option<u64>,

    /// Page size
    #[arg(long, value_name = "N", global = true)]
    pub limit: Option<u64>,

    /// MongoDB connection URI
    #[arg(long, value_name = "URI", global = true)]
    pub uri: Option<String>,

    /// Database name
    #[arg(long, value_name = "NAME", global = true)]
    pub database: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for pagexport
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export search results
    Search(SearchCommand),

    /// Export a seller's orders
    Orders(OrdersCommand),

    /// Re-export a JSON array file through the same pipeline
    Replay {
        /// JSON array of documents
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        /// Column set to use for CSV output
        #[arg(long, value_enum, default_value = "search")]
        scheme: SchemeArg,

        /// JSON array of user documents for the nickname column
        #[arg(long, value_name = "FILE")]
        users: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Print the effective configuration as TOML
        #[arg(long)]
        show: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Case-insensitive title search
    #[arg(long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Category id
    #[arg(long, value_name = "ID")]
    pub category: Option<String>,

    /// Restrict to one seller
    #[arg(long, value_name = "ID")]
    pub seller_id: Option<i64>,
}

#[derive(Args, Debug)]
pub struct OrdersCommand {
    /// Seller whose orders are exported
    #[arg(long, value_name = "ID")]
    pub seller_id: i64,

    /// Order status filter, repeatable
    #[arg(long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,

    /// Restrict to one buyer
    #[arg(long, value_name = "ID")]
    pub buyer_id: Option<i64>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeArg {
    Search,
    Orders,
}

impl From<SchemeArg> for PagingScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Search => PagingScheme::Search,
            SchemeArg::Orders => PagingScheme::Orders,
        }
    }
}

impl From<&SearchCommand> for SearchArgs {
    fn from(cmd: &SearchCommand) -> Self {
        SearchArgs {
            query: cmd.query.clone(),
            category: cmd.category.clone(),
            seller_id: cmd.seller_id,
        }
    }
}

impl From<&OrdersCommand> for OrderArgs {
    fn from(cmd: &OrdersCommand) -> Self {
        OrderArgs {
            seller_id: cmd.seller_id,
            statuses: cmd.statuses.clone(),
            buyer_id: cmd.buyer_id,
        }
    }
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Effective configuration
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already-parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and apply argument overrides
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        config.validate()?;
        Ok(config)
    }

    /// Override configuration values with arguments that were given
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if let Some(format) = args.format {
            config.export.format = format;
        }
        if args.extra_column {
            config.export.include_extra_column = true;
        }
        if let Some(offset) = args.offset {
            config.export.offset = offset;
        }
        if let Some(limit) = args.limit {
            config.export.limit = limit;
        }
        if args.no_progress {
            config.export.progress = false;
        }

        if let Some(uri) = &args.uri {
            config.source.uri = uri.clone();
        }
        if let Some(database) = &args.database {
            config.source.database = database.clone();
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Export options after all overrides
    pub fn export_options(&self) -> ExportOptions {
        self.config.export_options()
    }

    /// Output destination
    pub fn sink_target(&self) -> SinkTarget {
        SinkTarget::from_arg(self.args.output.as_deref())
    }

    /// Whether to draw the progress bar
    ///
    /// Quiet mode suppresses it as well.
    pub fn show_progress(&self) -> bool {
        self.config.export.progress && !self.args.quiet
    }

    /// Config file in use, if one was given
    pub fn config_path(&self) -> Option<&Path> {
        self.args.config_file.as_deref()
    }

    /// Handle commands that do not export
    ///
    /// # Returns
    /// * `Result<bool>` - True if the command was handled
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Commands::Version => {
                println!("pagexport version {}", env!("CARGO_PKG_VERSION"));
                Ok(true)
            }
            Commands::Config { show } => {
                if *show {
                    print!("{}", self.config.to_toml()?);
                } else {
                    let path = self
                        .config_path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(Config::default_path);
                    println!("Configuration file: {}", path.display());
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
