pub mod config;

use crate::core::{Result, StoreError};
use crate::storage::{Database, DocumentStore, MemoryStore, MongoStore};
use std::sync::Arc;
use tracing::{info, warn};

pub use config::{ConfigError, StoreBackend, StoreConfig};

/// Store client
///
/// Created once at startup and shared by every request handler through
/// [`Database`] handles. Cheap to clone, safe for concurrent use.
#[derive(Clone)]
pub struct Client {
    default_database: String,
    store: Arc<dyn DocumentStore>,
}

impl Client {
    /// Open the configured backend.
    ///
    /// A MongoDB server must answer a ping within `config.connect_timeout`.
    /// The memory backend has nothing to reach and is ready immediately.
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store: Arc<dyn DocumentStore> = match &config.backend {
            StoreBackend::Memory => {
                warn!(
                    database = %config.database,
                    "using the in-process memory store; documents are lost on restart"
                );
                Arc::new(MemoryStore::new())
            }
            StoreBackend::MongoDb { .. } => {
                let store =
                    MongoStore::connect(&config.connection_string(), config.connect_timeout).await?;
                tokio::time::timeout(config.connect_timeout, store.ping())
                    .await
                    .map_err(|_| StoreError::Timeout(config.connect_timeout))??;

                info!(url = %config.to_url(), "connected to MongoDB");
                Arc::new(store)
            }
        };

        Ok(Self {
            default_database: config.database,
            store,
        })
    }

    /// Connect using a connection string
    ///
    /// Format: `mongodb://[username:password@]host[:port]/database` or
    /// `memdb:///database`.
    pub async fn connect_url(url: &str) -> Result<Self> {
        let config = StoreConfig::from_url(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::connect(config).await
    }

    pub fn database(&self, name: &str) -> Database {
        Database::new(name, Arc::clone(&self.store))
    }

    /// The database named in the connection string
    pub fn default_database(&self) -> Database {
        self.database(&self.default_database)
    }

    /// Close the client; handles obtained earlier start failing with
    /// [`StoreError::Closed`].
    pub fn shutdown(&self) {
        self.store.shutdown();
        info!("document store client shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Document;
    use crate::storage::Filter;
    use std::time::Duration;

    #[tokio::test]
    async fn test_connect_url_uses_database_from_url() {
        let client = Client::connect_url("memdb:///fiber-hrms").await.unwrap();
        let db = client.default_database();
        assert_eq!(db.name(), "fiber-hrms");
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_config() {
        for url in ["postgres://localhost/db", "memdb://no-such-host.invalid:1/x"] {
            let err = Client::connect_url(url).await.err().unwrap();
            assert!(matches!(err, StoreError::Connection(_)), "{url}");
        }
    }

    #[tokio::test]
    async fn test_connect_fails_when_mongodb_is_unreachable() {
        let config = StoreConfig::mongodb("127.0.0.1", 1, "fiber-hrms")
            .connect_timeout(Duration::from_millis(300));

        let err = Client::connect(config).await.err().unwrap();
        assert!(
            matches!(err, StoreError::Connection(_) | StoreError::Timeout(_)),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_databases_share_one_store() {
        let client = Client::connect(StoreConfig::memory("fiber-hrms")).await.unwrap();
        let employees = client.default_database().collection("employees");
        employees
            .insert_one(Document::new().with("name", "Ada"))
            .await
            .unwrap();

        let again = client.database("fiber-hrms").collection("employees");
        assert_eq!(again.count_documents(&Filter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_existing_handles() {
        let client = Client::connect(StoreConfig::memory("fiber-hrms")).await.unwrap();
        let db = client.default_database();
        client.shutdown();

        assert!(matches!(db.ping().await, Err(StoreError::Closed)));
    }
}
