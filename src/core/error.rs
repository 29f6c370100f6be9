use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("server selection timed out after {0:?}")]
    Timeout(Duration),

    #[error("duplicate key error in collection '{collection}': _id {id}")]
    DuplicateKey { collection: String, id: String },

    #[error("performing an update on the path '{0}' would modify the immutable field '{0}'")]
    ImmutableField(String),

    #[error("cannot decode document: {0}")]
    Decode(String),

    #[error("document {0} not found after insert")]
    Missing(String),

    #[error("store command failed: {0}")]
    Command(String),

    #[error("store is shut down")]
    Closed,
}

pub type Result<T> = std::result::Result<T, StoreError>;
