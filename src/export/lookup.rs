//! Id → document lookup used to resolve display names (nicknames)

use async_trait::async_trait;

use crate::error::LookupError;

use super::Document;

/// Resolves a user identifier to that user's document
///
/// `Ok(None)` means the id is unknown. Callers treat every failure as a
/// missing value.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn lookup(&self, id: &Document) -> std::result::Result<Option<Document>, LookupError>;
}
