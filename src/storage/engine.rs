use super::query::{Filter, Update};
use crate::core::{Document, ObjectId, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOneResult {
    pub inserted_id: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Document store client - allows pluggable storage backends
///
/// Every primitive addresses a named collection. Implementations must be
/// safe to share across concurrently running request handlers; the service
/// holds one instance behind an `Arc` for the whole process.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Count documents matching `filter`
    async fn count_documents(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// All documents matching `filter`, in natural order
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// First document matching `filter`
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Insert a document, assigning `_id` when it has none
    async fn insert_one(&self, collection: &str, document: Document) -> Result<InsertOneResult>;

    /// Apply `update` to the first match and return the document as it was
    /// before the update, or `None` when nothing matched
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>>;

    /// Delete the first document matching `filter`
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()>;

    /// Refuse further calls. Handles already given out fail with
    /// `StoreError::Closed` from now on.
    fn shutdown(&self) {}
}
