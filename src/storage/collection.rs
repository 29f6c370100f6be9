use super::engine::{DeleteResult, DocumentStore, InsertOneResult};
use super::query::{Filter, Update};
use crate::core::{Document, Result};
use std::fmt;
use std::sync::Arc;

/// Named database over a shared store client.
///
/// Cloning is cheap; all clones talk to the same store.
#[derive(Clone)]
pub struct Database {
    name: Arc<str>,
    store: Arc<dyn DocumentStore>,
}

impl Database {
    pub fn new(name: &str, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            name: Arc::from(name),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            namespace: Arc::from(format!("{}.{}", self.name, name)),
            name_offset: self.name.len() + 1,
            store: Arc::clone(&self.store),
        }
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").field("name", &self.name).finish()
    }
}

/// Handle to one collection.
///
/// The store is addressed by the full `database.collection` namespace so
/// two databases on one store never share documents.
#[derive(Clone)]
pub struct Collection {
    namespace: Arc<str>,
    name_offset: usize,
    store: Arc<dyn DocumentStore>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.namespace[self.name_offset..]
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn count_documents(&self, filter: &Filter) -> Result<u64> {
        self.store.count_documents(&self.namespace, filter).await
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        self.store.find(&self.namespace, filter).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        self.store.find_one(&self.namespace, filter).await
    }

    pub async fn insert_one(&self, document: Document) -> Result<InsertOneResult> {
        self.store.insert_one(&self.namespace, document).await
    }

    pub async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>> {
        self.store
            .find_one_and_update(&self.namespace, filter, update)
            .await
    }

    pub async fn delete_one(&self, filter: &Filter) -> Result<DeleteResult> {
        self.store.delete_one(&self.namespace, filter).await
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("namespace", &self.namespace)
            .finish()
    }
}
