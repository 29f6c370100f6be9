use super::engine::{DeleteResult, DocumentStore, InsertOneResult};
use super::query::{Filter, Update};
use crate::core::{Document, ObjectId, Result, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

type CollectionHandle = Arc<RwLock<Vec<Document>>>;

/// Process-local document store.
///
/// Each collection sits behind its own lock, so writers on one collection
/// never block readers of another. The outer lock only guards the set of
/// collection names and is held just long enough to clone a handle.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionHandle>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    async fn get_collection(&self, name: &str) -> Result<Option<CollectionHandle>> {
        self.ensure_open()?;
        Ok(self.collections.read().await.get(name).cloned())
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<CollectionHandle> {
        if let Some(handle) = self.get_collection(name).await? {
            return Ok(handle);
        }

        let mut collections = self.collections.write().await;
        let handle = collections.entry(name.to_string()).or_insert_with(|| {
            debug!(collection = name, "creating collection");
            Arc::new(RwLock::new(Vec::new()))
        });
        Ok(Arc::clone(handle))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn count_documents(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let Some(handle) = self.get_collection(collection).await? else {
            return Ok(0);
        };
        let docs = handle.read().await;
        let count = if filter.is_empty() {
            docs.len()
        } else {
            docs.iter().filter(|doc| filter.matches(doc)).count()
        };
        Ok(count as u64)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let Some(handle) = self.get_collection(collection).await? else {
            return Ok(Vec::new());
        };
        let docs = handle.read().await;
        Ok(docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let Some(handle) = self.get_collection(collection).await? else {
            return Ok(None);
        };
        let docs = handle.read().await;
        Ok(docs.iter().find(|doc| filter.matches(doc)).cloned())
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<InsertOneResult> {
        let handle = self.get_or_create_collection(collection).await?;
        let mut docs = handle.write().await;

        let id = match document.id() {
            Some(id) => {
                if docs.iter().any(|doc| doc.id() == Some(id)) {
                    return Err(StoreError::DuplicateKey {
                        collection: collection.to_string(),
                        id: id.to_hex(),
                    });
                }
                id
            }
            None => {
                let id = ObjectId::new();
                document.prepend_id(id);
                id
            }
        };

        docs.push(document);
        Ok(InsertOneResult { inserted_id: id })
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>> {
        let Some(handle) = self.get_collection(collection).await? else {
            return Ok(None);
        };
        let mut docs = handle.write().await;
        let Some(target) = docs.iter_mut().find(|doc| filter.matches(doc)) else {
            return Ok(None);
        };

        let before = target.clone();
        let mut updated = before.clone();
        update.apply(&mut updated)?;
        *target = updated;
        Ok(Some(before))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult> {
        let Some(handle) = self.get_collection(collection).await? else {
            return Ok(DeleteResult { deleted_count: 0 });
        };
        let mut docs = handle.write().await;
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(position) => {
                docs.remove(position);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult { deleted_count: 0 }),
        }
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_open()
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
