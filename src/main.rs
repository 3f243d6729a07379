//! pagexport - paginated streaming exports
//!
//! Pulls search results or orders from MongoDB one page at a time and streams
//! them to a CSV or JSON file (or stdout).
//!
//! # Usage
//!
//! ```bash
//! pagexport search --query "usb c" -f csv -o items.csv
//! pagexport orders --seller-id 42 --status paid -f csv --extra-column -o orders.csv
//! ```

use std::sync::Arc;

use pagexport::cli::{CliInterface, Commands};
use pagexport::error::Result;
use pagexport::export::{ExportResult, PagingScheme, UserLookup};
use pagexport::exporter::{Exporter, run_export};
use pagexport::source::{MemoryPageSource, MemoryUserLookup, connect};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle non-export subcommands or run the export
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let result = run_export_command(&cli).await?;

    eprintln!(
        "Exported {} documents ({} bytes) in {} ms",
        result.documents_exported, result.bytes_written, result.elapsed_ms
    );
    Ok(())
}

/// Dispatch the export subcommands
async fn run_export_command(cli: &CliInterface) -> Result<ExportResult> {
    let options = cli.export_options();
    let target = cli.sink_target();

    match &cli.args().command {
        Commands::Search(cmd) => {
            let exporter = connect_exporter(cli).await?;
            exporter.export_search(&target, &cmd.into(), &options).await
        }
        Commands::Orders(cmd) => {
            let exporter = connect_exporter(cli).await?;
            exporter.export_orders(&target, &cmd.into(), &options).await
        }
        Commands::Replay {
            input,
            scheme,
            users,
        } => {
            let source = MemoryPageSource::from_json_file(input).await?;
            let lookup: Option<Arc<dyn UserLookup>> = match users {
                Some(path) => Some(Arc::new(MemoryUserLookup::from_json_file(path).await?)),
                None => None,
            };
            run_export(
                source,
                PagingScheme::from(*scheme),
                &target,
                &options,
                lookup,
                cli.show_progress(),
            )
            .await
        }
        Commands::Config { .. } | Commands::Version => {
            Err("command does not produce an export".into())
        }
    }
}

async fn connect_exporter(cli: &CliInterface) -> Result<Exporter> {
    let source_config = cli.config().source.clone();
    let database = connect(&source_config).await?;
    Ok(Exporter::new(database, source_config).with_progress(cli.show_progress()))
}

/// Initialize logging to stderr so stdout stays free for output
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
