//! MongoDB-backed page source and user lookup

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document as BsonDocument, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::{ExportError, LookupError, Result, describe_mongodb_error};
use crate::export::{Document, Page, PageSource, UserLookup};

use super::convert::{document_to_json, json_to_bson};

/// Connect to the database named in `config`
///
/// The driver connects lazily; a ping makes connection problems show up
/// before any output file is created.
pub async fn connect(config: &SourceConfig) -> Result<Database> {
    let mut options = ClientOptions::parse(&config.uri).await?;
    let timeout = config.connection_timeout();
    options.app_name = Some(format!("pagexport/{}", env!("CARGO_PKG_VERSION")));
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);

    let client = Client::with_options(options)?;
    let database = client.database(&config.database);
    database.run_command(doc! { "ping": 1 }).await?;

    info!("Connected to database {}", config.database);
    Ok(database)
}

/// Page source over a filtered, sorted collection
pub struct MongoPageSource {
    collection: Collection<BsonDocument>,
    filter: BsonDocument,
    sort: BsonDocument,
}

impl MongoPageSource {
    pub fn new(
        collection: Collection<BsonDocument>,
        filter: BsonDocument,
        sort: BsonDocument,
    ) -> Self {
        Self {
            collection,
            filter,
            sort,
        }
    }
}

#[async_trait]
impl PageSource for MongoPageSource {
    async fn fetch(&mut self, offset: u64, limit: u64) -> Result<Page> {
        let fetch_failed =
            |e: mongodb::error::Error| ExportError::FetchFailed(describe_mongodb_error(&e));

        let total = self
            .collection
            .count_documents(self.filter.clone())
            .await
            .map_err(fetch_failed)?;

        let mut cursor = self
            .collection
            .find(self.filter.clone())
            .sort(self.sort.clone())
            .skip(offset)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
            .map_err(fetch_failed)?;

        let mut items = Vec::with_capacity(limit.min(total) as usize);
        while let Some(doc) = cursor.try_next().await.map_err(fetch_failed)? {
            items.push(document_to_json(&doc));
        }

        debug!(
            "{}: fetched {} of {} at offset {}",
            self.collection.name(),
            items.len(),
            total,
            offset
        );

        Ok(Page {
            total,
            offset,
            limit,
            items,
        })
    }
}

/// User lookup by `id` in a users collection
pub struct MongoUserLookup {
    collection: Collection<BsonDocument>,
}

impl MongoUserLookup {
    pub fn new(collection: Collection<BsonDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl UserLookup for MongoUserLookup {
    async fn lookup(&self, id: &Document) -> std::result::Result<Option<Document>, LookupError> {
        let key = json_to_bson(id).ok_or_else(|| LookupError::InvalidId(id.to_string()))?;

        let user = self
            .collection
            .find_one(doc! { "id": key })
            .await
            .map_err(|e| LookupError::Backend(describe_mongodb_error(&e)))?;

        Ok(user.as_ref().map(document_to_json))
    }
}
