// ============================================================================
// hrms: employee records over a document store
// ============================================================================

pub mod config;
pub mod connection;
pub mod core;
pub mod model;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::connection::{Client, StoreBackend, StoreConfig};
pub use crate::core::{Document, ObjectId, ObjectIdError, Result, StoreError, Value};
pub use crate::model::Employee;
pub use crate::storage::{Collection, Database, DocumentStore, Filter, MemoryStore, MongoStore, Update};
pub use crate::web::{ApiError, AppState, StatusPolicy, build_router};
