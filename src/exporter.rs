//! Export entry points
//!
//! Resolves the page source and formatter for a paging scheme, opens the sink
//! and hands everything to the [`ExportCoordinator`].

use std::sync::Arc;

use chrono::Local;
use mongodb::Database;
use tracing::info;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::export::{
    ExportCoordinator, ExportOptions, ExportResult, OrderArgs, OutputFormat, PageSource, Pager,
    PagingScheme, ProgressTracker, SearchArgs, SinkTarget, UserLookup,
};
use crate::source::{MongoPageSource, MongoUserLookup};

/// Run one export against any page source
///
/// # Arguments
/// * `source` - Page source already bound to the scheme's query arguments
/// * `scheme` - Selects the column set for CSV output
/// * `target` - Destination
/// * `options` - Format, extra column and first window
/// * `lookup` - Needed only for CSV with the extra column
/// * `progress` - Draw a progress bar on stderr
pub async fn run_export<S: PageSource>(
    source: S,
    scheme: PagingScheme,
    target: &SinkTarget,
    options: &ExportOptions,
    lookup: Option<Arc<dyn UserLookup>>,
    progress: bool,
) -> Result<ExportResult> {
    options.validate()?;

    let formatter = scheme.formatter(options, lookup);
    let pager = Pager::new(source, options.offset, options.limit);
    let sink = target.open().await?;

    info!(
        "Exporting {:?} as {} (offset {}, limit {})",
        scheme, options.format, options.offset, options.limit
    );

    ExportCoordinator::new(pager, formatter, sink)
        .with_progress(ProgressTracker::new(progress))
        .execute()
        .await
}

/// Exports backed by a MongoDB database
pub struct Exporter {
    database: Database,
    config: SourceConfig,
    progress: bool,
}

impl Exporter {
    pub fn new(database: Database, config: SourceConfig) -> Self {
        Self {
            database,
            config,
            progress: false,
        }
    }

    /// Draw a progress bar during exports
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Export search results matching `args`
    pub async fn export_search(
        &self,
        target: &SinkTarget,
        args: &SearchArgs,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let scheme = PagingScheme::Search;
        let source = MongoPageSource::new(
            self.database.collection(&self.config.items_collection),
            args.filter(),
            scheme.sort(),
        );
        run_export(source, scheme, target, options, self.lookup(options), self.progress).await
    }

    /// Export orders matching `args`
    pub async fn export_orders(
        &self,
        target: &SinkTarget,
        args: &OrderArgs,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let scheme = PagingScheme::Orders;
        let source = MongoPageSource::new(
            self.database.collection(&self.config.orders_collection),
            args.filter(),
            scheme.sort(),
        );
        run_export(source, scheme, target, options, self.lookup(options), self.progress).await
    }

    fn lookup(&self, options: &ExportOptions) -> Option<Arc<dyn UserLookup>> {
        if options.format != OutputFormat::Csv || !options.include_extra_column {
            return None;
        }
        let users = self.database.collection(&self.config.users_collection);
        Some(Arc::new(MongoUserLookup::new(users)))
    }
}

/// Suggested file name for an export started now
pub fn default_filename(scheme: PagingScheme, format: OutputFormat) -> String {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let prefix = match scheme {
        PagingScheme::Search => "search",
        PagingScheme::Orders => "orders",
    };
    format!("{}-{}.{}", prefix, timestamp, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, PagexportError};
    use crate::source::{MemoryPageSource, MemoryUserLookup};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_default_filename() {
        let name = default_filename(PagingScheme::Orders, OutputFormat::Csv);
        assert!(name.starts_with("orders-"));
        assert!(name.ends_with(".csv"));
    }

    #[tokio::test]
    async fn test_run_export_rejects_zero_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        let source = MemoryPageSource::new((0..3).map(|i| json!({ "id": i })).collect());
        let fetches = source.fetch_counter();

        let err = run_export(
            source,
            PagingScheme::Search,
            &SinkTarget::File(path.clone()),
            &ExportOptions::new(OutputFormat::Json).with_limit(0),
            None,
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            PagexportError::Config(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_run_export_orders_with_nicknames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        let orders = vec![
            json!({
                "id": 1, "status": "paid", "total_amount": 99.9,
                "buyer": { "id": 5 }, "seller": { "id": 42 }
            }),
            json!({
                "id": 2, "status": "cancelled", "total_amount": 10,
                "buyer": { "id": 6 }, "seller": { "id": 42 }
            }),
        ];
        let users = MemoryUserLookup::new([json!({ "id": 5, "nickname": "BUYER5" })]);
        let options = ExportOptions::new(OutputFormat::Csv)
            .with_extra_column(true)
            .with_limit(1);

        let result = run_export(
            MemoryPageSource::new(orders),
            PagingScheme::Orders,
            &SinkTarget::File(path.clone()),
            &options,
            Some(Arc::new(users)),
            false,
        )
        .await
        .unwrap();

        assert_eq!(result.documents_exported, 2);
        assert_eq!(result.pages_fetched, 2);
        let out = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            out,
            "id,status,date_created,total_amount,currency_id,buyer.id,seller.id,buyer.nickname\n\
             1,\"paid\",\"\",99.9,\"\",5,42,\"BUYER5\"\n\
             2,\"cancelled\",\"\",10,\"\",6,42,\"\"\n"
        );
    }
}
